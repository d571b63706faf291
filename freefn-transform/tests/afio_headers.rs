//! End-to-end generation against real AFIO headers and synthetic ones

use freefn_transform::{transform_header, FreeFnConfig, TransformError};
use proptest::prelude::*;

const FILE_HANDLE: &str = include_str!("fixtures/file_handle.hpp");
const PATH_HANDLE: &str = include_str!("fixtures/path_handle.hpp");
const IO_HANDLE: &str = include_str!("fixtures/io_handle.hpp");
const HANDLE: &str = include_str!("fixtures/handle.hpp");

/// The header with its generated block (and the blank line after it) cut out
fn without_block(text: &str, config: &FreeFnConfig) -> String {
    let mut out = String::new();
    let mut inside = false;
    let mut skip_blank = false;
    for line in text.split_inclusive('\n') {
        if line.contains(config.block_begin.as_str()) {
            inside = true;
            continue;
        }
        if inside {
            if line.contains(config.block_end.as_str()) {
                inside = false;
                skip_blank = true;
            }
            continue;
        }
        if skip_blank {
            skip_blank = false;
            if line.trim().is_empty() {
                continue;
            }
        }
        out.push_str(line);
    }
    out
}

#[test]
fn committed_headers_are_up_to_date() -> freefn_transform::Result<()> {
    let config = FreeFnConfig::default();
    for header in [FILE_HANDLE, PATH_HANDLE, IO_HANDLE, HANDLE] {
        let transform = transform_header(header, &config)?;
        assert!(!transform.changed);
        assert_eq!(transform.output, header);
    }
    Ok(())
}

#[test]
fn regenerates_removed_block() -> freefn_transform::Result<()> {
    let config = FreeFnConfig::default();
    for header in [FILE_HANDLE, PATH_HANDLE, IO_HANDLE, HANDLE] {
        let stripped = without_block(header, &config);
        assert!(!stripped.contains(config.block_begin.as_str()));

        let transform = transform_header(&stripped, &config)?;
        assert!(transform.changed);
        assert_eq!(transform.output, header);
    }
    Ok(())
}

#[test]
fn file_handle_functions_are_reported_in_order() -> freefn_transform::Result<()> {
    let transform = transform_header(FILE_HANDLE, &FreeFnConfig::default())?;
    let names: Vec<(&str, bool)> = transform
        .freed
        .iter()
        .map(|f| (f.name.as_str(), f.is_static))
        .collect();
    assert_eq!(
        names,
        vec![
            ("swap", false),
            ("file", true),
            ("random_file", true),
            ("temp_file", true),
            ("temp_inode", true),
            ("length", false),
            ("truncate", false),
            ("extents", false),
            ("zero", false),
        ]
    );
    assert!(transform.freed.iter().all(|f| f.class_name == "file_handle"));
    Ok(())
}

#[test]
fn io_handle_members_keep_their_overloads_in_place() -> freefn_transform::Result<()> {
    let transform = transform_header(IO_HANDLE, &FreeFnConfig::default())?;
    let names: Vec<&str> = transform.freed.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["read", "write", "barrier"]);
    assert!(transform.output.contains(
        "inline io_handle::io_result<io_handle::buffers_type> read(io_handle &self, io_handle::io_request<io_handle::buffers_type> reqs, deadline d = deadline()) noexcept\n"
    ));
    assert_eq!(transform.output.matches("inline io_handle::io_result<io_handle::buffer_type> read(").count(), 0);
    Ok(())
}

#[test]
fn handle_members_with_inline_bodies() -> freefn_transform::Result<()> {
    let transform = transform_header(HANDLE, &FreeFnConfig::default())?;
    let names: Vec<&str> = transform.freed.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["swap", "close"]);
    assert!(transform.output.contains("inline void swap(handle &self, handle &o) noexcept\n{\n  return self.swap(std::forward<decltype(o)>(o));\n}\n"));
    Ok(())
}

#[test]
fn long_comparison_defaults_are_carried_through() -> freefn_transform::Result<()> {
    let default: Vec<String> = (0..48).map(|i| format!("a{i} < b{i}")).collect();
    let default = default.join(" || ");
    let header = format!(
        "class A\n{{\n  AFIO_MAKE_FREE_FUNCTION\n  static void f(bool x = {default}, int y = 0);\n}};\nAFIO_V2_NAMESPACE_END\n"
    );
    let transform = transform_header(&header, &FreeFnConfig::default())?;
    assert_eq!(transform.freed.len(), 1);
    assert!(transform
        .output
        .contains(&format!("inline void f(bool x = {default}, int y = 0)\n")));
    Ok(())
}

#[test]
fn static_member_with_default_argument() -> freefn_transform::Result<()> {
    let header = "\
class A
{
  AFIO_MAKE_FREE_FUNCTION
  static void f(int x, int y = 0);
};
AFIO_V2_NAMESPACE_END
";
    let transform = transform_header(header, &FreeFnConfig::default())?;
    assert!(transform.output.contains(
        "// BEGIN make_free_functions.py\n\
inline void f(int x, int y = 0)\n\
{\n  return A::f(std::forward<decltype(x)>(x), std::forward<decltype(y)>(y));\n}\n\
// END make_free_functions.py\n\nAFIO_V2_NAMESPACE_END\n"
    ));
    Ok(())
}

#[test]
fn const_member_gets_const_self_and_nested_types_are_qualified() -> freefn_transform::Result<()> {
    let header = "\
class AFIO_DECL B
{
  //! Read some bytes
  AFIO_MAKE_FREE_FUNCTION
  virtual io_result<buffers_type> peek(extent_type offset, mode m = mode::read) const noexcept = 0;
};
AFIO_V2_NAMESPACE_END
";
    let transform = transform_header(header, &FreeFnConfig::default())?;
    assert!(transform.output.contains(
        "//! Read some bytes\n\
inline B::io_result<B::buffers_type> peek(const B &self, B::extent_type offset, B::mode m = B::mode::read) noexcept\n\
{\n  return self.peek(std::forward<decltype(offset)>(offset), std::forward<decltype(m)>(m));\n}\n"
    ));
    Ok(())
}

#[test]
fn missing_namespace_end_is_an_error() {
    let header = "class A\n{\n  AFIO_MAKE_FREE_FUNCTION\n  void f();\n};\n";
    assert!(matches!(
        transform_header(header, &FreeFnConfig::default()),
        Err(TransformError::MissingAnchor { .. })
    ));
}

#[test]
fn custom_marker_and_anchor() -> freefn_transform::Result<()> {
    let config = FreeFnConfig {
        marker: "MAKE_FREE".to_string(),
        namespace_end: "} // namespace io".to_string(),
        ..FreeFnConfig::default()
    };
    let header = "namespace io {\nclass C\n{\n  MAKE_FREE\n  int size() const;\n};\n} // namespace io\n";
    let transform = transform_header(header, &config)?;
    assert!(transform.output.contains("inline int size(const C &self)\n"));
    assert!(transform.output.ends_with("// END make_free_functions.py\n\n} // namespace io\n"));
    Ok(())
}

fn declaration() -> impl Strategy<Value = (bool, String, Vec<String>)> {
    (
        any::<bool>(),
        "[a-z][a-z0-9_]{0,8}",
        proptest::collection::vec("[a-z][a-z0-9]{0,5}", 0..4),
    )
}

proptest! {
    #[test]
    fn prop_generation_is_idempotent(decls in proptest::collection::vec(declaration(), 1..6)) {
        let mut header = String::from("class AFIO_DECL widget\n{\npublic:\n");
        for (is_static, name, params) in &decls {
            let params: Vec<String> = params
                .iter()
                .enumerate()
                .map(|(i, p)| format!("extent_type {p}_{i}"))
                .collect();
            header.push_str("  AFIO_MAKE_FREE_FUNCTION\n");
            header.push_str(&format!(
                "  {}result<size_type> fn_{name}({}) noexcept;\n",
                if *is_static { "static " } else { "" },
                params.join(", ")
            ));
        }
        header.push_str("};\n\nAFIO_V2_NAMESPACE_END\n");

        let config = FreeFnConfig::default();
        let first = transform_header(&header, &config).unwrap();
        prop_assert!(first.changed);
        prop_assert_eq!(first.freed.len(), decls.len());

        let second = transform_header(&first.output, &config).unwrap();
        prop_assert!(!second.changed);
        prop_assert_eq!(&second.output, &first.output);
        prop_assert_eq!(
            first.output.matches("// BEGIN make_free_functions.py").count(),
            1
        );
    }
}
