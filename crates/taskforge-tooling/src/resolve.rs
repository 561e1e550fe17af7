use std::path::{Path, PathBuf};

/// File name of the signing tool.
pub const SIGN_TOOL_FILE_NAME: &str = "signtool.exe";

/// Environment variables naming the program files roots, in search order.
const PROGRAM_FILES_ROOTS: [&str; 2] = ["ProgramFiles(x86)", "ProgramFiles"];

/// SDK directories under each root that ship the signing tool.
const SDK_BIN_DIRS: [&[&str]; 4] = [
    &["Windows Kits", "10", "bin", "x86"],
    &["Windows Kits", "8.1", "bin", "x86"],
    &["Windows Kits", "8.0", "bin", "x86"],
    &["Microsoft SDKs", "Windows", "v7.0A", "bin"],
];

/// Well-known install locations of the signing tool.
///
/// `lookup` resolves environment variables; roots that are unset are skipped.
pub fn default_search_list<F>(lookup: F) -> Vec<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    PROGRAM_FILES_ROOTS
        .iter()
        .filter_map(|root| lookup(root))
        .filter(|root| !root.is_empty())
        .flat_map(|root| {
            SDK_BIN_DIRS.iter().map(move |segments| {
                let mut path = PathBuf::from(&root);
                path.extend(segments.iter());
                path.join(SIGN_TOOL_FILE_NAME)
            })
        })
        .collect()
}

/// Pick the executable to launch.
///
/// An explicit path is used only if it exists; it never falls back to the
/// search list. Without one, the first existing entry of `search_list` wins.
pub fn resolve_executable_path(explicit: Option<&Path>, search_list: &[PathBuf]) -> Option<PathBuf> {
    if let Some(path) = explicit {
        tracing::debug!("Checking explicit executable {}", path.display());
        return path.is_file().then(|| path.to_path_buf());
    }

    let found = search_list.iter().find(|candidate| candidate.is_file()).cloned();
    match &found {
        Some(path) => tracing::debug!("Found executable at {}", path.display()),
        None => tracing::debug!("No executable in {} search locations", search_list.len()),
    }
    found
}
