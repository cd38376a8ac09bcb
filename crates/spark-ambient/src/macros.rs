/// 声明一个以 `thread_local!` 为存储的零尺寸协调器。
///
/// # 设计目标（Why）
/// - 最常见的环境上下文存储就是“一线程一槽位”；`thread_local!` 静态量无法泛型化，
///   因此以宏的形式为每个上下文类型生成独立的槽位与协调器类型；
/// - 生成的类型是零尺寸且 `Copy`，可以直接按值交给多个装饰器共享。
///
/// # 使用方式（How）
/// ```
/// use spark_ambient::ContextCoordinator;
///
/// spark_ambient::thread_local_coordinator! {
///     /// 当前请求所属租户。
///     pub TenantContext: String
/// }
///
/// TenantContext.set(Some("tenant-42".to_owned()));
/// assert_eq!(TenantContext.get().as_deref(), Some("tenant-42"));
/// assert_eq!(TenantContext.replace(None).as_deref(), Some("tenant-42"));
/// assert_eq!(TenantContext.get(), None);
/// ```
///
/// # 契约说明（What）
/// - 槽位初始为 `None`；
/// - `replace` 被覆写为 `RefCell::replace`，安装与读取旧值只需一次访问，无需克隆。
#[macro_export]
macro_rules! thread_local_coordinator {
    ($(#[$meta:meta])* $vis:vis $name:ident : $ty:ty) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
        $vis struct $name;

        impl $name {
            fn slot() -> &'static ::std::thread::LocalKey<
                ::core::cell::RefCell<::core::option::Option<$ty>>,
            > {
                ::std::thread_local! {
                    static SLOT: ::core::cell::RefCell<::core::option::Option<$ty>> =
                        const { ::core::cell::RefCell::new(::core::option::Option::None) };
                }
                &SLOT
            }
        }

        impl $crate::ContextCoordinator for $name {
            type Context = $ty;

            fn get(&self) -> ::core::option::Option<$ty> {
                Self::slot().with(|slot| slot.borrow().clone())
            }

            fn set(&self, context: ::core::option::Option<$ty>) {
                Self::slot().with(|slot| {
                    *slot.borrow_mut() = context;
                })
            }

            fn replace(&self, context: ::core::option::Option<$ty>) -> ::core::option::Option<$ty> {
                Self::slot().with(|slot| slot.replace(context))
            }
        }
    };
}
