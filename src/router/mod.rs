//! 页面路由
//! 基础路由始终存在，动态路由在每个会话首次导航时按权限注册一次

mod guard;
mod location;
mod route;
mod table;

pub use guard::{
    is_superseded, GuardDecision, Navigation, Router, ACCESS_DENIED_NOTICE,
    BOOTSTRAP_FAILED_NOTICE, MAX_REDIRECTS,
};
pub use location::Location;
pub use route::{
    async_routes, catch_all_route, constant_routes, filter_routes, RouteMeta, RouteRecord,
    CATCH_ALL_PATH, LOGIN_PATH, NOT_FOUND_PATH, ROOT_PATH, WHITELIST,
};
pub use table::{ResolvedRoute, RouteTable};
