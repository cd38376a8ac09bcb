//! 装饰器的声明式配置。
//!
//! # 设计目标（Why）
//! - 宿主通常在配置文件中声明“某个线程池是否传播上下文、以哪种方式捕获”，
//!   因此捕获方式与装饰器名称以 `serde` 结构体暴露，可直接从 TOML/JSON/YAML 反序列化；
//! - 所有字段均有默认值，空配置等价于“动态捕获、匿名装饰器”。
//!
//! # 契约说明（What）
//! - [`CaptureMode::Dynamic`]：每次提交时读取协调器；
//! - [`CaptureMode::Fixed`]：构造时读取一次，此后所有任务共享该值；
//! - `name` 只用于日志字段，不参与任何语义判断。

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// 上下文的捕获时机。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureMode {
    /// 每次提交时捕获提交线程的当前值。
    #[default]
    Dynamic,
    /// 装饰器构造时捕获一次。
    Fixed,
}

impl CaptureMode {
    /// 用于日志字段的稳定名称。
    pub const fn as_str(self) -> &'static str {
        match self {
            CaptureMode::Dynamic => "dynamic",
            CaptureMode::Fixed => "fixed",
        }
    }
}

/// 装饰器的可配置项。
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropagationOptions {
    /// 出现在日志中的装饰器名称。
    pub name: Option<Cow<'static, str>>,
    /// 捕获时机。
    pub capture: CaptureMode,
}

impl PropagationOptions {
    /// 以给定名称构造配置，其余字段取默认值。
    pub fn named(name: impl Into<Cow<'static, str>>) -> Self {
        PropagationOptions {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    /// 替换捕获时机。
    pub fn with_capture(mut self, capture: CaptureMode) -> Self {
        self.capture = capture;
        self
    }
}
