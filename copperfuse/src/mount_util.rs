use std::os::fd::RawFd;

/// Parse a pre-opened descriptor reference of the form `/dev/fd/<n>`.
///
/// Returns the descriptor number, or `None` if `mountpoint` is anything
/// else (including trailing garbage after the number).
pub fn parse_fd(mountpoint: &str) -> Option<RawFd> {
    let digits = mountpoint.strip_prefix("/dev/fd/")?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_descriptor_reference() {
        assert_eq!(parse_fd("/dev/fd/3"), Some(3));
        assert_eq!(parse_fd("/dev/fd/0"), Some(0));
        assert_eq!(parse_fd("/dev/fd/017"), Some(17));
    }

    #[test]
    fn rejects_other_paths() {
        assert_eq!(parse_fd("/mnt/fuse"), None);
        assert_eq!(parse_fd("/dev/fd/"), None);
        assert_eq!(parse_fd("/dev/fd/3x"), None);
        assert_eq!(parse_fd("/dev/fd/-1"), None);
        assert_eq!(parse_fd("/dev/fd/ 3"), None);
        assert_eq!(parse_fd("dev/fd/3"), None);
    }

    #[test]
    fn rejects_descriptor_out_of_range() {
        assert_eq!(parse_fd("/dev/fd/99999999999"), None);
    }
}
