/// Marker the sign tool prints when a timestamp server is involved.
const TIMESTAMP_SERVER: &str = "timestamp server";
/// Marker the sign tool prints when the server did not answer.
const NOT_REACHED: &str = "could not be reached";

/// What a line of tool output says about the attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineClass {
    /// Nothing notable
    Unclassified,
    /// The timestamp server could not be reached; another server may work
    TransientTimestampFailure,
}

/// Classify one line of the sign tool's error output.
///
/// Matches the tool's wording case-sensitively, e.g.
/// `Error: The specified timestamp server could not be reached.` and
/// `Error: The specified timestamp server either could not be reached or returned an invalid response.`
pub fn classify(line: &str) -> LineClass {
    if line.contains(TIMESTAMP_SERVER) && line.contains(NOT_REACHED) {
        LineClass::TransientTimestampFailure
    } else {
        LineClass::Unclassified
    }
}
