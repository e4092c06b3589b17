use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Derive the validator's result file from the aggregate file by inserting
/// `suffix` before the extension: `out/agg.txt` → `out/agg_output.txt`.
pub fn derive_result_path(agg_file: &Path, suffix: &str) -> PathBuf {
    let mut name = agg_file
        .file_stem()
        .map(OsString::from)
        .unwrap_or_default();
    name.push(suffix);
    if let Some(ext) = agg_file.extension() {
        name.push(".");
        name.push(ext);
    }
    agg_file.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("agg.txt", "agg_output.txt")]
    #[case("agg", "agg_output")]
    #[case("out/agg.net.txt", "out/agg.net_output.txt")]
    #[case("dir.v2/agg", "dir.v2/agg_output")]
    #[case(".agg", ".agg_output")]
    fn test_derive_result_path(#[case] agg: &str, #[case] expected: &str) {
        assert_eq!(
            derive_result_path(Path::new(agg), "_output"),
            PathBuf::from(expected)
        );
    }
}
