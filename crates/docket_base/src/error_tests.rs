/* 📖 # Why a separate file for the error tests?

Some cases assert on span traces, which embed source line numbers. Keeping the tests
out of error.rs keeps those numbers stable when the error module changes.
*/

#[cfg(test)]
mod tests {
    use crate::error::ErrorKind;
    use crate::{DocketError, DocketResult, ResultExt};
    use expect_test::expect;
    use std::error::Error;
    use std::io;
    use std::path::PathBuf;
    use tracing_error::ErrorLayer;
    use tracing_subscriber::layer::SubscriberExt;

    fn decode_error() -> DocketError {
        DocketError::new(ErrorKind::StaticFileDecode {
            unit: "orders.war".to_string(),
            path: "META-INF/openapi.yaml".to_string(),
            source: "invalid type: sequence, expected a map".into(),
        })
    }

    #[test]
    fn test_error_from_file_error() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let path = PathBuf::from("META-INF/openapi.json");
        let error = DocketError::new(ErrorKind::FileError {
            path: path.clone(),
            source: io_err,
        });

        match error.kind() {
            ErrorKind::FileError { path: p, .. } => assert_eq!(p, &path),
            _ => panic!("Expected FileError variant"),
        }
        assert!(!error.is_assembly_failure());
    }

    #[test]
    fn test_static_file_decode_names_unit_and_path() {
        let error = decode_error();

        expect![[r#"Failed to load static file META-INF/openapi.yaml for deployment orders.war: invalid type: sequence, expected a map"#]]
            .assert_eq(&error.to_string());
        assert!(error.is_assembly_failure());
        assert!(error.source().is_some());
    }

    #[test]
    fn test_hook_kinds_are_assembly_failures() {
        let failed = DocketError::new(ErrorKind::HookFailed {
            unit: "a.war".to_string(),
            hook: "com.acme.Reader".to_string(),
        });
        let missing = DocketError::new(ErrorKind::HookNotFound {
            unit: "a.war".to_string(),
            hook: "com.acme.Filter".to_string(),
        });

        assert!(failed.is_assembly_failure());
        assert!(missing.is_assembly_failure());
        assert!(!DocketError::message("plain").is_assembly_failure());
        assert_eq!(
            missing.to_string(),
            "Hook 'com.acme.Filter' configured for deployment a.war could not be resolved"
        );
    }

    #[test]
    fn test_error_context_attachment() {
        let error = DocketError::message("original error")
            .context("first context")
            .with_context(|| "second context".to_string());

        assert_eq!(error.get_context(), ["first context", "second context"]);
        assert_eq!(
            error.to_string(),
            "first context: second context: original error"
        );
    }

    #[test]
    fn test_hook_failure_keeps_cause() {
        let cause = DocketError::message("database unavailable");
        let error = DocketError::new(ErrorKind::HookFailed {
            unit: "a.war".to_string(),
            hook: "com.acme.Reader".to_string(),
        })
        .caused_by(cause);

        assert_eq!(
            error.cause().map(|c| c.to_string()),
            Some("database unavailable".to_string())
        );
        assert_eq!(error.root_cause().to_string(), "database unavailable");
    }

    #[test]
    fn test_root_cause_of_file_error_is_io_error() {
        let error = DocketError::new(ErrorKind::FileError {
            path: PathBuf::from("x"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "access denied"),
        });
        assert_eq!(error.root_cause().to_string(), "access denied");
    }

    #[test]
    fn test_result_ext_chaining() {
        let result: DocketResult<i32> = Err(Box::new(DocketError::message("root")));
        let err = result
            .context("step 1")
            .with_context(|| "step 2".to_string())
            .unwrap_err();
        assert_eq!(err.to_string(), "step 1: step 2: root");
    }

    #[test]
    fn test_result_ext_success_is_untouched() {
        let result: DocketResult<i32> = Ok(42);
        assert_eq!(result.context("unused").unwrap(), 42);
    }

    #[test]
    fn test_err_and_bail_macros() {
        fn fails(path: &str) -> DocketResult<()> {
            crate::bail!("no document at {}", path);
        }

        let err = fails("/openapi").unwrap_err();
        assert_eq!(err.to_string(), "no document at /openapi");

        let built = crate::err!("code {}", 7);
        assert_eq!(built.to_string(), "code 7");
    }

    #[test]
    fn test_debug_tree_without_span_trace() {
        let error = DocketError::message("something went wrong")
            .context("during assembly")
            .context("in deployment orders.war");

        expect![[r#"
            something went wrong
            ├─ during assembly
            └─ in deployment orders.war
        "#]]
        .assert_eq(&format!("{:?}", error));
    }

    #[test]
    fn test_debug_tree_nested_causes() {
        let inner = DocketError::message("inner error").context("inner context");
        let middle = decode_error().context("middle context").caused_by(inner);
        let outer = DocketError::message("outer error")
            .context("outer context")
            .caused_by(middle);

        expect![[r#"
            outer error
            ├─ outer context
            └─ cause: Failed to load static file META-INF/openapi.yaml for deployment orders.war: invalid type: sequence, expected a map
               ├─ middle context
               └─ cause: inner error
                  └─ inner context
        "#]]
        .assert_eq(&format!("{:?}", outer));
    }

    #[test]
    fn test_span_trace_is_captured_inside_span() {
        let subscriber = tracing_subscriber::registry().with(ErrorLayer::default());

        tracing::subscriber::with_default(subscriber, || {
            let span = tracing::info_span!("deploy_unit");
            let _guard = span.enter();

            let error = DocketError::message("boom");
            let rendered = format!("{:?}", error);

            assert!(rendered.starts_with("boom\n"));
            assert!(rendered.contains("Trace:"));
            assert!(rendered.contains("deploy_unit"));
        });
    }
}
