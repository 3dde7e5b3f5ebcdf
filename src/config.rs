//! 스캔 옵션
//!
//! [`ScanOptions`]는 한 번의 스캔 호출에 적용되는 옵션을 담습니다.
//! 옵션은 호출별로 소유되며 호출 간 공유 상태가 없습니다.
//!
//! # 사용 예시
//!
//! ```
//! use godep_scanner::ScanOptions;
//!
//! // 기본값으로 생성
//! let options = ScanOptions::default();
//! options.validate().unwrap();
//!
//! // 빌더로 생성
//! let options = ScanOptions::builder()
//!     .include_go_standard_library_deps(true)
//!     .include_package_urls(true)
//!     .additional_args(vec!["-e".to_owned()])
//!     .build()
//!     .unwrap();
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ScannerError;

/// 추가 인자 상한
const MAX_ADDITIONAL_ARGS: usize = 32;

/// 스캔 옵션
///
/// # 필드
///
/// - **include_go_standard_library_deps**: 표준 라이브러리 패키지를
///   `std/` 노드로 그래프에 포함할지 여부
/// - **include_package_urls**: 각 노드에 purl 식별자를 부여할지 여부
/// - **additional_args**: listing 명령에 그대로 전달되는 추가 인자
///   (이 crate는 내용을 해석하지 않음)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanOptions {
    /// 표준 라이브러리 패키지 포함 여부
    pub include_go_standard_library_deps: bool,
    /// Package URL 생성 여부
    pub include_package_urls: bool,
    /// listing 명령 추가 인자 (예: `-e`)
    pub additional_args: Vec<String>,
}

impl ScanOptions {
    /// 새 빌더를 생성합니다.
    pub fn builder() -> ScanOptionsBuilder {
        ScanOptionsBuilder::default()
    }

    /// 옵션 값의 유효성을 검증합니다.
    ///
    /// # 검증 규칙
    ///
    /// - `additional_args`: 최대 32개, 각 인자는 비어있지 않아야 하며
    ///   개행/NUL 문자를 포함할 수 없음
    pub fn validate(&self) -> Result<(), ScannerError> {
        if self.additional_args.len() > MAX_ADDITIONAL_ARGS {
            return Err(ScannerError::Config {
                field: "additional_args".to_owned(),
                reason: format!("at most {MAX_ADDITIONAL_ARGS} arguments allowed"),
            });
        }

        for arg in &self.additional_args {
            if arg.is_empty() {
                return Err(ScannerError::Config {
                    field: "additional_args".to_owned(),
                    reason: "argument must not be empty".to_owned(),
                });
            }
            if arg.contains(['\n', '\r', '\0']) {
                return Err(ScannerError::Config {
                    field: "additional_args".to_owned(),
                    reason: format!("argument '{}' contains a control character", arg.escape_debug()),
                });
            }
        }

        Ok(())
    }
}

/// [`ScanOptions`] 빌더
#[derive(Default)]
pub struct ScanOptionsBuilder {
    options: ScanOptions,
}

impl ScanOptionsBuilder {
    /// 표준 라이브러리 패키지 포함 여부를 설정합니다.
    pub fn include_go_standard_library_deps(mut self, include: bool) -> Self {
        self.options.include_go_standard_library_deps = include;
        self
    }

    /// Package URL 생성 여부를 설정합니다.
    pub fn include_package_urls(mut self, include: bool) -> Self {
        self.options.include_package_urls = include;
        self
    }

    /// listing 명령 추가 인자를 설정합니다.
    pub fn additional_args(mut self, args: Vec<String>) -> Self {
        self.options.additional_args = args;
        self
    }

    /// 옵션을 검증하고 빌드합니다.
    ///
    /// # Errors
    ///
    /// 유효성 검증 실패 시 `ScannerError::Config` 반환
    pub fn build(self) -> Result<ScanOptions, ScannerError> {
        self.options.validate()?;
        Ok(self.options)
    }
}
