//! legacy manifest/lock 파서 -- Gopkg.lock, Gopkg.toml, vendor.json
//!
//! legacy 패키지 관리자(dep, govendor)의 manifest/lock 파일에서
//! 고정 버전 테이블과 ignore 패턴을 추출하여 [`GoProjectConfig`]를
//! 생성합니다.
//!
//! # 지원 형식
//!
//! - `Gopkg.lock` + `Gopkg.toml` (TOML) -- [`golangdep`]
//! - `vendor.json` (JSON) -- [`govendor`]
//!
//! 파싱 실패는 문제의 파일명을 담아 `failed parsing <file>: <cause>`
//! 형태로 즉시 실패하며 재시도하지 않습니다.

pub mod golangdep;
pub mod govendor;

use std::fs;
use std::path::Path;

use crate::error::ScannerError;
use crate::types::{GoProjectConfig, PackageManager};

/// 대상 manifest 파일을 읽고 파싱하여 프로젝트 설정을 생성합니다.
///
/// 패키지 관리자는 대상 파일명으로 판별합니다. dep의 경우 lock 파일
/// 옆의 `Gopkg.toml` manifest도 함께 읽습니다.
///
/// # Errors
///
/// - 알 수 없는 대상 파일: `ScannerError::UnsupportedTargetFile`
/// - 파일 읽기 실패: `ScannerError::Io`
/// - 내용 파싱 실패: `ScannerError::ManifestParse`
pub fn load_project_config(root: &Path, target_file: &str) -> Result<GoProjectConfig, ScannerError> {
    let target_path = root.join(target_file);
    let manager = PackageManager::from_target_file(&target_path).ok_or_else(|| {
        ScannerError::UnsupportedTargetFile {
            path: target_file.to_owned(),
        }
    })?;

    match manager {
        PackageManager::GolangDep => {
            let lock_content = read_file(&target_path)?;
            let manifest_path = target_path
                .parent()
                .unwrap_or(root)
                .join("Gopkg.toml");
            let manifest_content = read_file(&manifest_path)?;

            let locked_versions =
                golangdep::parse_dep_lock(&lock_content, &target_path.to_string_lossy())?;
            let ignored_pkgs = golangdep::parse_dep_manifest(
                &manifest_content,
                &manifest_path.to_string_lossy(),
            )?;
            Ok(GoProjectConfig {
                locked_versions,
                ignored_pkgs,
            })
        }
        PackageManager::Govendor => {
            let content = read_file(&target_path)?;
            govendor::parse_govendor_config(&content, &target_path.to_string_lossy())
        }
        // go modules는 lock 테이블이 아니라 listing의 모듈 메타데이터로
        // 버전을 귀속하므로 여기서는 대상이 아님
        PackageManager::GoModules => Err(ScannerError::UnsupportedTargetFile {
            path: target_file.to_owned(),
        }),
    }
}

fn read_file(path: &Path) -> Result<String, ScannerError> {
    fs::read_to_string(path).map_err(|source| ScannerError::Io {
        path: path.to_string_lossy().into_owned(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn load_config_for_dep_project() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("Gopkg.lock"),
            r#"
[[projects]]
  name = "github.com/foo/bar"
  version = "v1.2.0"
  packages = ["."]
"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("Gopkg.toml"),
            "ignored = [\"github.com/ignored/pkg\"]\n",
        )
        .unwrap();

        let config = load_project_config(dir.path(), "Gopkg.lock").unwrap();
        assert_eq!(
            config.locked_versions["github.com/foo/bar"].version,
            "v1.2.0",
        );
        assert_eq!(config.ignored_pkgs, vec!["github.com/ignored/pkg"]);
    }

    #[test]
    fn load_config_for_govendor_project() {
        let dir = tempfile::tempdir().unwrap();
        let vendor_dir = dir.path().join("vendor");
        fs::create_dir(&vendor_dir).unwrap();
        fs::write(
            vendor_dir.join("vendor.json"),
            r#"{"package": [{"path": "github.com/foo/bar", "revision": "abc123"}]}"#,
        )
        .unwrap();

        let config = load_project_config(dir.path(), "vendor/vendor.json").unwrap();
        assert_eq!(config.locked_versions["github.com/foo/bar"].version, "#abc123");
    }

    #[test]
    fn load_config_rejects_unknown_target() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_project_config(dir.path(), "package.json");
        assert!(matches!(
            result,
            Err(ScannerError::UnsupportedTargetFile { .. }),
        ));
    }

    #[test]
    fn load_config_reports_missing_lock_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_project_config(dir.path(), "Gopkg.lock");
        assert!(matches!(result, Err(ScannerError::Io { .. })));
    }

    #[test]
    fn load_config_reports_missing_dep_manifest() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("Gopkg.lock"), "").unwrap();
        let result = load_project_config(dir.path(), "Gopkg.lock");
        // lock은 있으나 Gopkg.toml이 없음
        assert!(matches!(result, Err(ScannerError::Io { .. })));
    }
}
