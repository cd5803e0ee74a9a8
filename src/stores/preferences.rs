//! 界面偏好：侧边栏、设备类型、主题、语言、面包屑与标签页

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::Result;
use crate::models::Breadcrumb;
use crate::storage::KeyValueStore;

pub const SIDEBAR_COLLAPSED_KEY: &str = "sidebar_collapsed";
pub const THEME_MODE_KEY: &str = "theme_mode";
pub const LANGUAGE_KEY: &str = "language";
pub const DEFAULT_LANGUAGE: &str = "zh-CN";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    Desktop,
    Tablet,
    Mobile,
}

impl Device {
    pub fn from_width(width: u32) -> Self {
        if width < 768 {
            Device::Mobile
        } else if width < 1024 {
            Device::Tablet
        } else {
            Device::Desktop
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tab {
    pub name: String,
    pub title: String,
    pub path: String,
    pub closable: bool,
}

impl Tab {
    pub fn new(name: impl Into<String>, title: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            path: path.into(),
            closable: true,
        }
    }

    pub fn pinned(mut self) -> Self {
        self.closable = false;
        self
    }
}

struct Chrome {
    sidebar_collapsed: bool,
    device: Device,
    dark: bool,
    language: String,
    breadcrumbs: Vec<Breadcrumb>,
    tabs: Vec<Tab>,
    active_tab: String,
}

pub struct PreferenceStore {
    local: Arc<dyn KeyValueStore>,
    state: RwLock<Chrome>,
}

impl PreferenceStore {
    pub fn load(local: Arc<dyn KeyValueStore>) -> Self {
        let state = Chrome {
            sidebar_collapsed: local.get(SIDEBAR_COLLAPSED_KEY).as_deref() == Some("true"),
            device: Device::Desktop,
            dark: local.get(THEME_MODE_KEY).as_deref() == Some("dark"),
            language: local
                .get(LANGUAGE_KEY)
                .filter(|l| !l.is_empty())
                .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
            breadcrumbs: Vec::new(),
            tabs: Vec::new(),
            active_tab: String::new(),
        };

        Self {
            local,
            state: RwLock::new(state),
        }
    }

    pub fn sidebar_collapsed(&self) -> bool {
        self.state.read().sidebar_collapsed
    }

    pub fn toggle_sidebar(&self) -> Result<bool> {
        let collapsed = !self.sidebar_collapsed();
        self.local
            .set(SIDEBAR_COLLAPSED_KEY, if collapsed { "true" } else { "false" }, None)?;
        self.state.write().sidebar_collapsed = collapsed;
        Ok(collapsed)
    }

    pub fn device(&self) -> Device {
        self.state.read().device
    }

    /// 移动端自动收起侧边栏（不落盘）
    pub fn set_device(&self, device: Device) {
        let mut state = self.state.write();
        state.device = device;
        if device == Device::Mobile {
            state.sidebar_collapsed = true;
        }
    }

    pub fn resize(&self, width: u32) -> Device {
        let device = Device::from_width(width);
        self.set_device(device);
        device
    }

    pub fn is_dark(&self) -> bool {
        self.state.read().dark
    }

    pub fn toggle_theme(&self) -> Result<bool> {
        let dark = !self.is_dark();
        self.local
            .set(THEME_MODE_KEY, if dark { "dark" } else { "light" }, None)?;
        self.state.write().dark = dark;
        Ok(dark)
    }

    pub fn language(&self) -> String {
        self.state.read().language.clone()
    }

    pub fn set_language(&self, language: &str) -> Result<()> {
        self.local.set(LANGUAGE_KEY, language, None)?;
        self.state.write().language = language.to_string();
        Ok(())
    }

    pub fn breadcrumbs(&self) -> Vec<Breadcrumb> {
        self.state.read().breadcrumbs.clone()
    }

    pub fn set_breadcrumbs(&self, crumbs: Vec<Breadcrumb>) {
        self.state.write().breadcrumbs = crumbs;
    }

    pub fn tabs(&self) -> Vec<Tab> {
        self.state.read().tabs.clone()
    }

    pub fn active_tab(&self) -> String {
        self.state.read().active_tab.clone()
    }

    pub fn set_active_tab(&self, name: &str) {
        self.state.write().active_tab = name.to_string();
    }

    /// 同名标签页只保留一个，并激活它
    pub fn add_tab(&self, tab: Tab) {
        let mut state = self.state.write();
        state.active_tab = tab.name.clone();
        if !state.tabs.iter().any(|t| t.name == tab.name) {
            state.tabs.push(tab);
        }
    }

    /// 关闭当前标签页时激活相邻的标签页
    pub fn remove_tab(&self, name: &str) {
        let mut state = self.state.write();
        let Some(index) = state.tabs.iter().position(|t| t.name == name) else {
            return;
        };
        state.tabs.remove(index);

        if state.active_tab == name && !state.tabs.is_empty() {
            let next = index.min(state.tabs.len() - 1);
            state.active_tab = state.tabs[next].name.clone();
        }
    }

    pub fn close_other_tabs(&self, keep: &str) {
        let mut state = self.state.write();
        state.tabs.retain(|t| t.name == keep || !t.closable);
        state.active_tab = keep.to_string();
    }

    pub fn close_all_tabs(&self) {
        let mut state = self.state.write();
        state.tabs.retain(|t| !t.closable);
        state.active_tab = state.tabs.first().map(|t| t.name.clone()).unwrap_or_default();
    }
}
