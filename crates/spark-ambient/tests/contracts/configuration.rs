use std::sync::mpsc;

use spark_ambient::{
    CaptureMode, ContextCoordinator, ContextExecutor, ContextPreserving, Executor,
    PropagationError, PropagationOptions, Runnable,
};

use super::support::{FixedThreadPool, Tenant, init_tracing};

/// 配置文本驱动装饰器：`capture = fixed` 时在 `build` 的线程上捕获一次。
///
/// # 测试步骤（How）
/// 1. 从 JSON 解析 [`PropagationOptions`]；
/// 2. 设置 `A` 后 `build`，再改为 `B` 提交任务；
///
/// # 输入/输出契约（What）
/// - 装饰器名称与捕获方式来自配置；任务观察到 `A`。
#[test]
fn options_from_configuration_drive_the_builder() {
    init_tracing();
    let options: PropagationOptions =
        serde_json::from_str(r#"{ "name": "reporting-pool", "capture": "fixed" }"#)
            .expect("配置文本应当可解析");

    Tenant.set(Some("A".to_owned()));
    let decorator = ContextExecutor::builder()
        .delegate(FixedThreadPool::new(1))
        .coordinator(Tenant)
        .options(options)
        .build()
        .expect("参数齐全");
    Tenant.set(Some("B".to_owned()));

    let (sender, receiver) = mpsc::channel();
    decorator
        .execute(Runnable::new(move || {
            sender.send(Tenant.get()).expect("测试线程仍在等待");
        }))
        .expect("线程池应当接收任务");

    assert_eq!(decorator.name(), "reporting-pool");
    assert_eq!(decorator.capture_mode(), CaptureMode::Fixed);
    assert_eq!(receiver.recv().expect("任务应当回传").as_deref(), Some("A"));
}

/// 缺失任务、委托设施或协调器时，构造器在产生任何包装对象前失败。
#[test]
fn builders_reject_absent_arguments() {
    init_tracing();

    let missing_task = ContextPreserving::<Runnable, Tenant>::builder()
        .coordinator(Tenant)
        .build();
    assert!(matches!(
        missing_task,
        Err(PropagationError::MissingArgument { argument: "task" })
    ));

    let missing_coordinator = ContextPreserving::<Runnable, Tenant>::builder()
        .task(Runnable::new(|| {}))
        .build();
    assert!(matches!(
        missing_coordinator,
        Err(PropagationError::MissingArgument {
            argument: "coordinator"
        })
    ));

    let missing_delegate = ContextExecutor::<FixedThreadPool, Tenant>::builder()
        .coordinator(Tenant)
        .build();
    assert!(matches!(
        missing_delegate,
        Err(PropagationError::MissingArgument {
            argument: "delegate"
        })
    ));

    let missing_decorator_coordinator = ContextExecutor::<FixedThreadPool, Tenant>::builder()
        .delegate(FixedThreadPool::new(1))
        .build();
    assert!(matches!(
        missing_decorator_coordinator,
        Err(PropagationError::MissingArgument {
            argument: "coordinator"
        })
    ));
}

/// 未知的捕获方式在解析阶段即被拒绝。
#[test]
fn unknown_capture_modes_are_rejected() {
    let parsed = serde_json::from_str::<PropagationOptions>(r#"{ "capture": "per_item" }"#);
    assert!(parsed.is_err());
}
