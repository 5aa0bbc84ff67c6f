//! Tests for the build spinner

#[cfg(test)]
mod tests {
    use mosaicbuild::io::progress::BuildProgress;

    // Tests quiet mode hides the spinner
    // Verified by always drawing the spinner
    #[test]
    fn test_quiet_is_hidden() {
        assert!(BuildProgress::new(true).is_hidden());
    }

    // Tests the spinner lifecycle on success
    // Verified by finishing before starting
    #[test]
    fn test_success_lifecycle() {
        let progress = BuildProgress::new(true);
        progress.start("Building 2x2 mosaic");
        progress.finish_success("done");
        assert!(progress.is_hidden());
    }

    // Tests the spinner lifecycle on failure
    // Verified by panicking on abandon
    #[test]
    fn test_failure_lifecycle() {
        let progress = BuildProgress::new(true);
        progress.start("Building");
        progress.finish_failure("worker crashed");
    }
}
