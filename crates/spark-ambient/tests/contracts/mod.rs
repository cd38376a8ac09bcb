//! 上下文传播合约测试入口。
//!
//! - `preserving_task`：包装任务的捕获、安装与恢复；
//! - `executor_capture`：单次提交装饰器的动态/固定捕获；
//! - `service_surface`：批量任务服务装饰器的完整接口面；
//! - `spawn_propagation`：异步派发的逐次轮询传播；
//! - `configuration`：声明式配置与构造器校验。


mod configuration;
mod preserving_task;
