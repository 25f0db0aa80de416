/* 📖 # PAL behaviour shared by both implementations

These tests run the same scenario against `MockPal` and `RealPal`, so that code
tested against the mock behaves the same on a real unit directory.
*/

#[cfg(test)]
mod pal_trait_tests {
    use crate::pal::{FilePath, MockPal, Pal, PalHandle, RealPal};
    use std::fs;
    use tempfile::TempDir;

    const RESOURCE: &str = "WEB-INF/classes/META-INF/openapi.json";

    fn mock_with_resource() -> PalHandle {
        let mock = MockPal::new();
        mock.add_file(FilePath::from(RESOURCE), r#"{"openapi":"3.0.3"}"#);
        PalHandle::new(mock)
    }

    fn real_with_resource(temp_dir: &TempDir) -> PalHandle {
        let full = temp_dir.path().join(RESOURCE);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(&full, r#"{"openapi":"3.0.3"}"#).unwrap();
        PalHandle::new(RealPal::new(temp_dir.path().to_path_buf()))
    }

    fn assert_resource_behaviour(pal: &PalHandle) {
        assert!(pal.file_exists(&FilePath::from(RESOURCE)).unwrap());
        assert!(!pal.file_exists(&FilePath::from("META-INF/openapi.json")).unwrap());
        assert_eq!(
            pal.read_file_to_string(&FilePath::from(RESOURCE)).unwrap(),
            r#"{"openapi":"3.0.3"}"#
        );
        assert!(pal.read_file(&FilePath::from("META-INF/openapi.json")).is_err());
    }

    #[test]
    fn test_mock_pal_behaviour() {
        assert_resource_behaviour(&mock_with_resource());
    }

    #[test]
    fn test_real_pal_behaviour() {
        let temp_dir = TempDir::new().unwrap();
        assert_resource_behaviour(&real_with_resource(&temp_dir));
    }

    #[test]
    fn test_read_file_to_string_invalid_utf8() {
        let mock = MockPal::new();
        mock.add_file(FilePath::from("bad.txt"), vec![0xFF, 0xFE]);

        assert!(mock.read_file_to_string(&FilePath::from("bad.txt")).is_err());
    }

    #[test]
    fn test_pal_handle_clones_share_implementation() {
        let mock = MockPal::new();
        let handle = PalHandle::new(mock.clone());
        let clone = handle.clone();

        handle.file_exists(&FilePath::from("a")).unwrap();
        clone.file_exists(&FilePath::from("b")).unwrap();
        assert_eq!(mock.access_count(), 2);
    }
}
