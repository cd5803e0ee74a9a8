//! 已注册路由表与路径匹配

use super::location::{join_path, normalize_path};
use super::route::{catch_all_route, constant_routes, RouteMeta, RouteRecord};

/// 路径匹配结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRoute {
    pub path: String,
    pub name: Option<String>,
    pub component: Option<String>,
    pub redirect: Option<String>,
    /// 从根到叶合并后的元信息
    pub meta: RouteMeta,
    /// 匹配链上每一级的完整路径
    pub matched: Vec<String>,
    pub is_fallback: bool,
}

pub struct RouteTable {
    constant: Vec<RouteRecord>,
    dynamic: Vec<RouteRecord>,
    fallback: Option<RouteRecord>,
    /// 动态路由所属的会话 epoch
    dynamic_epoch: Option<u64>,
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteTable {
    pub fn new() -> Self {
        Self {
            constant: constant_routes(),
            dynamic: Vec::new(),
            fallback: None,
            dynamic_epoch: None,
        }
    }

    /// 替换整组动态路由并在最后挂上兜底路由
    pub fn replace_dynamic(&mut self, routes: Vec<RouteRecord>, epoch: u64) {
        self.dynamic = routes;
        self.fallback = Some(catch_all_route());
        self.dynamic_epoch = Some(epoch);
    }

    /// 回到只有基础路由的状态
    pub fn clear_dynamic(&mut self) {
        self.dynamic.clear();
        self.fallback = None;
        self.dynamic_epoch = None;
    }

    /// 动态路由不属于 `epoch` 对应的会话时清空
    pub fn retain_epoch(&mut self, epoch: u64) {
        if self.dynamic_epoch.is_some_and(|e| e != epoch) {
            tracing::debug!(epoch, "Dropping routes registered for a previous session");
            self.clear_dynamic();
        }
    }

    pub fn has_dynamic(&self) -> bool {
        self.dynamic_epoch.is_some()
    }

    pub fn dynamic_routes(&self) -> &[RouteRecord] {
        &self.dynamic
    }

    /// 扁平列出所有已注册路由的完整路径，顺序即匹配顺序
    pub fn paths(&self) -> Vec<String> {
        fn collect(records: &[RouteRecord], parent: &str, out: &mut Vec<String>) {
            for record in records {
                let full = join_path(parent, &record.path);
                out.push(full.clone());
                collect(&record.children, &full, out);
            }
        }

        let mut out = Vec::new();
        collect(&self.constant, "/", &mut out);
        collect(&self.dynamic, "/", &mut out);
        if let Some(fallback) = &self.fallback {
            out.push(fallback.path.clone());
        }
        out
    }

    /// 匹配路径；精确匹配优先，其次兜底路由
    pub fn resolve(&self, path: &str) -> Option<ResolvedRoute> {
        let target = normalize_path(path);
        let exact = find(&self.constant, "/", &target, &RouteMeta::default(), &mut Vec::new())
            .or_else(|| find(&self.dynamic, "/", &target, &RouteMeta::default(), &mut Vec::new()));
        if exact.is_some() {
            return exact;
        }

        self.fallback.as_ref().map(|fallback| ResolvedRoute {
            path: target,
            name: fallback.name.clone(),
            component: fallback.component.clone(),
            redirect: fallback.redirect.clone(),
            meta: fallback.meta.clone(),
            matched: vec![fallback.path.clone()],
            is_fallback: true,
        })
    }
}

fn find(
    records: &[RouteRecord],
    parent: &str,
    target: &str,
    parent_meta: &RouteMeta,
    chain: &mut Vec<String>,
) -> Option<ResolvedRoute> {
    for record in records {
        let full = join_path(parent, &record.path);
        let meta = parent_meta.merged_with(&record.meta);
        chain.push(full.clone());

        let hit = if full == target {
            Some(ResolvedRoute {
                path: full.clone(),
                name: record.name.clone(),
                component: record.component.clone(),
                redirect: record.redirect.clone(),
                meta: meta.clone(),
                matched: chain.clone(),
                is_fallback: false,
            })
        } else {
            find(&record.children, &full, target, &meta, chain)
        };

        chain.pop();
        if hit.is_some() {
            return hit;
        }
    }
    None
}
