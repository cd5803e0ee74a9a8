//! 路由记录与候选路由表

use std::collections::{BTreeSet, HashSet};

pub const LOGIN_PATH: &str = "/login";
pub const NOT_FOUND_PATH: &str = "/404";
pub const ROOT_PATH: &str = "/";
pub const CATCH_ALL_PATH: &str = "/:pathMatch(.*)*";

/// 未登录也可访问的路径
pub const WHITELIST: [&str; 2] = [LOGIN_PATH, NOT_FOUND_PATH];

/// 路由元信息
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteMeta {
    pub title: String,
    pub icon: Option<String>,
    pub required_permissions: BTreeSet<String>,
    pub hidden: bool,
    pub keep_alive: bool,
    pub affix: bool,
}

impl RouteMeta {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn permission(mut self, code: impl Into<String>) -> Self {
        self.required_permissions.insert(code.into());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn keep_alive(mut self) -> Self {
        self.keep_alive = true;
        self
    }

    pub fn affix(mut self) -> Self {
        self.affix = true;
        self
    }

    /// 未声明权限，或持有任一声明的权限
    pub fn allows(&self, granted: &HashSet<String>) -> bool {
        self.required_permissions.is_empty()
            || self.required_permissions.iter().any(|code| granted.contains(code))
    }

    /// 父子元信息合并：子路由已设置的字段覆盖父路由
    pub fn merged_with(&self, child: &RouteMeta) -> RouteMeta {
        RouteMeta {
            title: if child.title.is_empty() {
                self.title.clone()
            } else {
                child.title.clone()
            },
            icon: child.icon.clone().or_else(|| self.icon.clone()),
            required_permissions: if child.required_permissions.is_empty() {
                self.required_permissions.clone()
            } else {
                child.required_permissions.clone()
            },
            hidden: self.hidden || child.hidden,
            keep_alive: self.keep_alive || child.keep_alive,
            affix: self.affix || child.affix,
        }
    }
}

/// 路由记录，子路由路径相对于父路由
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRecord {
    pub path: String,
    pub name: Option<String>,
    pub component: Option<String>,
    pub redirect: Option<String>,
    pub meta: RouteMeta,
    pub children: Vec<RouteRecord>,
}

impl RouteRecord {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: None,
            component: None,
            redirect: None,
            meta: RouteMeta::default(),
            children: Vec::new(),
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn component(mut self, component: impl Into<String>) -> Self {
        self.component = Some(component.into());
        self
    }

    pub fn redirect(mut self, to: impl Into<String>) -> Self {
        self.redirect = Some(to.into());
        self
    }

    pub fn meta(mut self, meta: RouteMeta) -> Self {
        self.meta = meta;
        self
    }

    pub fn child(mut self, child: RouteRecord) -> Self {
        self.children.push(child);
        self
    }

    pub fn is_catch_all(&self) -> bool {
        self.path == CATCH_ALL_PATH
    }
}

/// 始终注册的基础路由
pub fn constant_routes() -> Vec<RouteRecord> {
    vec![
        RouteRecord::new(LOGIN_PATH)
            .name("Login")
            .component("Login")
            .meta(RouteMeta::new("登录").hidden()),
        RouteRecord::new(NOT_FOUND_PATH)
            .name("404")
            .component("error/404")
            .meta(RouteMeta::new("页面不存在").hidden()),
        RouteRecord::new(ROOT_PATH)
            .name("Root")
            .redirect("/dashboard")
            .meta(RouteMeta::default().hidden()),
    ]
}

/// 按权限筛选的候选动态路由
pub fn async_routes() -> Vec<RouteRecord> {
    vec![
        RouteRecord::new("/dashboard")
            .name("Dashboard")
            .component("Dashboard")
            .meta(RouteMeta::new("仪表板").icon("DataAnalysis").affix()),
        RouteRecord::new("/system")
            .component("Layout")
            .redirect("/system/users")
            .meta(RouteMeta::new("系统管理").icon("Setting"))
            .child(
                RouteRecord::new("users")
                    .name("SystemUsers")
                    .component("system/Users")
                    .meta(RouteMeta::new("用户管理").icon("User").permission("system:user:list")),
            )
            .child(
                RouteRecord::new("roles")
                    .name("SystemRoles")
                    .component("system/Roles")
                    .meta(RouteMeta::new("角色管理").icon("Lock").permission("system:role:list")),
            )
            .child(
                RouteRecord::new("permissions")
                    .name("SystemPermissions")
                    .component("system/Permissions")
                    .meta(
                        RouteMeta::new("权限管理")
                            .icon("Key")
                            .permission("system:permission:list"),
                    ),
            ),
        RouteRecord::new("/monitor")
            .component("Layout")
            .redirect("/monitor/online")
            .meta(RouteMeta::new("系统监控").icon("Monitor"))
            .child(
                RouteRecord::new("online")
                    .name("MonitorOnline")
                    .component("monitor/Online")
                    .meta(
                        RouteMeta::new("在线用户")
                            .icon("Connection")
                            .permission("system:monitor:online"),
                    ),
            )
            .child(
                RouteRecord::new("server")
                    .name("MonitorServer")
                    .component("monitor/Server")
                    .meta(
                        RouteMeta::new("服务监控")
                            .icon("Cpu")
                            .permission("system:monitor:server")
                            .keep_alive(),
                    ),
            ),
        RouteRecord::new("/logs")
            .component("Layout")
            .redirect("/logs/operation")
            .meta(RouteMeta::new("日志管理").icon("Document"))
            .child(
                RouteRecord::new("operation")
                    .name("OperationLogs")
                    .component("logs/Operation")
                    .meta(
                        RouteMeta::new("操作日志")
                            .icon("Notebook")
                            .permission("system:log:operation"),
                    ),
            )
            .child(
                RouteRecord::new("login")
                    .name("LoginLogs")
                    .component("logs/Login")
                    .meta(
                        RouteMeta::new("登录日志")
                            .icon("Tickets")
                            .permission("system:log:login"),
                    ),
            ),
        RouteRecord::new("/profile")
            .component("Layout")
            .redirect("/profile/index")
            .meta(RouteMeta::default().hidden())
            .child(
                RouteRecord::new("index")
                    .name("Profile")
                    .component("profile/index")
                    .meta(RouteMeta::new("个人中心").icon("User")),
            ),
    ]
}

/// 所有未匹配路径重定向到 404，必须最后注册
pub fn catch_all_route() -> RouteRecord {
    RouteRecord::new(CATCH_ALL_PATH)
        .redirect(NOT_FOUND_PATH)
        .meta(RouteMeta::default().hidden())
}

/// 按已授权权限筛选路由，返回新的路由树
pub fn filter_routes(routes: &[RouteRecord], granted: &HashSet<String>) -> Vec<RouteRecord> {
    routes
        .iter()
        .filter_map(|route| {
            let children = filter_routes(&route.children, granted);
            if !route.meta.allows(granted) {
                return None;
            }
            Some(RouteRecord {
                children,
                ..route.clone()
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn granted(codes: &[&str]) -> HashSet<String> {
        codes.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_meta_allows_any_of_declared() {
        let meta = RouteMeta::new("x").permission("a").permission("b");
        assert!(meta.allows(&granted(&["b"])));
        assert!(!meta.allows(&granted(&["c"])));
        assert!(RouteMeta::new("open").allows(&granted(&[])));
    }

    #[test]
    fn test_filter_routes_keeps_only_granted_children() {
        let routes = filter_routes(&async_routes(), &granted(&["system:role:list"]));
        let system = routes.iter().find(|r| r.path == "/system").unwrap();
        let names: Vec<_> = system.children.iter().filter_map(|c| c.name.as_deref()).collect();
        assert_eq!(names, vec!["SystemRoles"]);

        let monitor = routes.iter().find(|r| r.path == "/monitor").unwrap();
        assert!(monitor.children.is_empty());
    }

    #[test]
    fn test_filter_routes_does_not_touch_source() {
        let source = async_routes();
        let _ = filter_routes(&source, &granted(&[]));
        assert_eq!(source, async_routes());
    }

    #[test]
    fn test_meta_merge_child_overrides() {
        let parent = RouteMeta::new("系统管理").icon("Setting").hidden();
        let child = RouteMeta::new("用户管理").permission("system:user:list");
        let merged = parent.merged_with(&child);
        assert_eq!(merged.title, "用户管理");
        assert_eq!(merged.icon.as_deref(), Some("Setting"));
        assert!(merged.hidden);
        assert!(merged.required_permissions.contains("system:user:list"));
    }
}
