//! vendor.json 파서 (govendor)
//!
//! govendor의 `vendor/vendor.json`에서 고정 버전 테이블과 ignore
//! 패턴을 추출합니다. 오래된 덤프는 필드를 대문자로 시작하기도 하므로
//! 두 표기를 모두 수용합니다.
//!
//! # vendor.json 형식 예시
//!
//! ```json
//! {
//!   "ignore": "test appengine github.com/skip/me",
//!   "package": [
//!     { "path": "github.com/foo/bar", "revision": "abc123", "versionExact": "v1.0.3" }
//!   ]
//! }
//! ```

use serde::Deserialize;

use crate::error::ScannerError;
use crate::types::{GoProjectConfig, LockedDep};

/// vendor.json 구조 (파싱용)
#[derive(Deserialize)]
struct GovendorJson {
    #[serde(default, alias = "Package")]
    package: Vec<GovendorPackage>,
    #[serde(default)]
    ignore: String,
}

/// vendor.json 내 개별 패키지 (파싱용)
#[derive(Deserialize)]
struct GovendorPackage {
    #[serde(default)]
    path: String,
    #[serde(default, alias = "Revision")]
    revision: Option<String>,
    #[serde(default, alias = "Version")]
    version: Option<String>,
    #[serde(default, rename = "versionExact")]
    version_exact: Option<String>,
}

/// vendor.json 내용을 파싱하여 프로젝트 설정을 생성합니다.
///
/// 버전은 `versionExact`를 우선하고, 없으면 revision 계열 필드로
/// `#<revision>` 형태를 만듭니다.
///
/// `ignore`는 공백으로 구분된 토큰 문자열입니다. `/`가 없는 토큰은
/// 패키지가 아니라 빌드 태그이므로 버립니다. 남은 토큰은 뒤따르는
/// `/`를 제거한 뒤 정확 경로와 `경로/*` 와일드카드 두 형태로
/// 추가됩니다.
pub fn parse_govendor_config(
    content: &str,
    source_path: &str,
) -> Result<GoProjectConfig, ScannerError> {
    let vendor: GovendorJson =
        serde_json::from_str(content).map_err(|e| ScannerError::ManifestParse {
            path: source_path.to_owned(),
            reason: e.to_string(),
        })?;

    let mut config = GoProjectConfig::default();

    for package in &vendor.package {
        let revision = package
            .revision
            .as_deref()
            .filter(|r| !r.is_empty())
            .or(package.version.as_deref())
            .unwrap_or_default();

        let version = match &package.version_exact {
            Some(exact) if !exact.is_empty() => exact.clone(),
            _ => format!("#{revision}"),
        };

        config.locked_versions.insert(
            package.path.clone(),
            LockedDep {
                name: package.path.clone(),
                version,
            },
        );
    }

    for token in vendor.ignore.split_whitespace() {
        if !token.contains('/') {
            continue; // 빌드 태그
        }
        let pkg_name = token.trim_end_matches('/');
        config.ignored_pkgs.push(pkg_name.to_owned());
        config.ignored_pkgs.push(format!("{pkg_name}/*"));
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_VENDOR_JSON: &str = r#"{
  "comment": "",
  "ignore": "test appengine github.com/skip/me github.com/trailing/slash/",
  "package": [
    {
      "path": "github.com/foo/bar",
      "revision": "9316a62528ac99aaecb4e47182b5853404b251cd",
      "versionExact": "v1.0.3"
    },
    {
      "path": "golang.org/x/crypto/ssh",
      "revision": "1351f936d976c60a0a48d728281922cf63eafb8d"
    }
  ],
  "rootPath": "github.com/example/app"
}"#;

    #[test]
    fn parse_prefers_version_exact() {
        let config = parse_govendor_config(SAMPLE_VENDOR_JSON, "vendor.json").unwrap();
        assert_eq!(config.locked_versions["github.com/foo/bar"].version, "v1.0.3");
    }

    #[test]
    fn parse_falls_back_to_revision_hash() {
        let config = parse_govendor_config(SAMPLE_VENDOR_JSON, "vendor.json").unwrap();
        assert_eq!(
            config.locked_versions["golang.org/x/crypto/ssh"].version,
            "#1351f936d976c60a0a48d728281922cf63eafb8d",
        );
    }

    #[test]
    fn parse_ignore_drops_build_tags_and_adds_wildcards() {
        let config = parse_govendor_config(SAMPLE_VENDOR_JSON, "vendor.json").unwrap();
        assert_eq!(
            config.ignored_pkgs,
            vec![
                "github.com/skip/me",
                "github.com/skip/me/*",
                "github.com/trailing/slash",
                "github.com/trailing/slash/*",
            ],
        );
    }

    #[test]
    fn parse_accepts_capitalized_package_key() {
        let config = parse_govendor_config(
            r#"{"Package": [{"path": "github.com/foo/bar", "Revision": "abc"}]}"#,
            "vendor.json",
        )
        .unwrap();
        assert_eq!(config.locked_versions["github.com/foo/bar"].version, "#abc");
    }

    #[test]
    fn parse_empty_document() {
        let config = parse_govendor_config("{}", "vendor.json").unwrap();
        assert!(config.locked_versions.is_empty());
        assert!(config.ignored_pkgs.is_empty());
    }

    #[test]
    fn parse_invalid_json_names_file() {
        let err = parse_govendor_config("not json!", "vendor/vendor.json").unwrap_err();
        assert!(err.to_string().starts_with("failed parsing vendor/vendor.json:"));
    }
}
