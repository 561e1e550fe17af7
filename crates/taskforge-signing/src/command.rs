use taskforge_core::{Identity, SigningRequest};
use taskforge_tooling::encode_argument;

/// Build the sign tool argument line for one attempt against `server`.
///
/// The grammar is fixed: `sign`, then `/sha1 <thumbprint>` or
/// `/f <pfx> [/p <password>]`, then `/t <server>`, `/d <description>` and the
/// files in request order. Every value is encoded on its own.
pub fn build_command_line(request: &SigningRequest, server: &str) -> String {
    let mut args = vec!["sign".to_owned()];

    match request.identity() {
        Some(Identity::Thumbprint(thumbprint)) => {
            args.push("/sha1".to_owned());
            args.push(encode_argument(thumbprint));
        }
        Some(Identity::PfxFile { path, password }) => {
            args.push("/f".to_owned());
            args.push(encode_argument(&path.to_string_lossy()));
            if let Some(password) = password {
                args.push("/p".to_owned());
                args.push(encode_argument(password));
            }
        }
        None => {}
    }

    if !server.trim().is_empty() {
        args.push("/t".to_owned());
        args.push(encode_argument(server));
    }

    if let Some(description) = request.description.as_deref().filter(|text| !text.is_empty()) {
        args.push("/d".to_owned());
        args.push(encode_argument(description));
    }

    args.extend(
        request
            .files
            .iter()
            .map(|file| encode_argument(&file.to_string_lossy())),
    );
    args.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn files() -> Vec<PathBuf> {
        vec![PathBuf::from("setup.exe"), PathBuf::from("My Tools/core.dll")]
    }

    #[test]
    fn test_thumbprint_mode() {
        let request = SigningRequest {
            files: files(),
            sha1_thumbprint: Some("ABC123".to_owned()),
            pfx_password: Some("unused".to_owned()),
            description: Some("My Product".to_owned()),
            ..SigningRequest::default()
        };

        assert_eq!(
            build_command_line(&request, "http://ts.example.com"),
            "sign /sha1 ABC123 /t http://ts.example.com /d \"My Product\" setup.exe \"My Tools/core.dll\""
        );
    }

    #[test]
    fn test_pfx_mode_with_password() {
        let dir = TempDir::new().unwrap();
        let pfx = dir.path().join("cert.pfx");
        fs::write(&pfx, b"pfx").unwrap();
        let request = SigningRequest {
            files: vec![PathBuf::from("a.exe")],
            pfx_file: Some(pfx.clone()),
            pfx_password: Some("p@ss word".to_owned()),
            ..SigningRequest::default()
        };

        let expected = format!(
            "sign /f {} /p \"p@ss word\" /t http://ts a.exe",
            encode_argument(&pfx.to_string_lossy())
        );
        assert_eq!(build_command_line(&request, "http://ts"), expected);
    }

    #[test]
    fn test_pfx_mode_without_password() {
        let dir = TempDir::new().unwrap();
        let pfx = dir.path().join("cert.pfx");
        fs::write(&pfx, b"pfx").unwrap();
        let request = SigningRequest {
            files: vec![PathBuf::from("a.exe")],
            pfx_file: Some(pfx),
            ..SigningRequest::default()
        };

        let line = build_command_line(&request, "http://ts");
        assert!(line.starts_with("sign /f "));
        assert!(!line.contains("/p"));
    }

    #[test]
    fn test_blank_server_and_missing_pfx_are_skipped() {
        let request = SigningRequest {
            files: files(),
            pfx_file: Some(PathBuf::from("/no/such/cert.pfx")),
            ..SigningRequest::default()
        };

        assert_eq!(
            build_command_line(&request, "  "),
            "sign setup.exe \"My Tools/core.dll\""
        );
    }
}
