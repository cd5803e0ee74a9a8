//! RBAC 管理控制台命令行入口

use anyhow::{bail, Context};
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use std::io::IsTerminal;
use std::sync::Arc;

use rbac_console::config::AppConfig;
use rbac_console::models::auth::LoginRequest;
use rbac_console::models::log::{LoginLogQuery, OperationLogQuery};
use rbac_console::models::permission::PermissionQuery;
use rbac_console::models::role::RoleQuery;
use rbac_console::models::user::UserQuery;
use rbac_console::models::{MenuNode, PageQuery, PermissionNode};
use rbac_console::router::Navigation;
use rbac_console::shell::Notifier;
use rbac_console::utils::format::{format_file_size, format_number, mask};
use rbac_console::{telemetry, Console};

/// RBAC management console
#[derive(Parser, Debug)]
#[command(name = "rbac-console")]
#[command(author, version)]
#[command(about = "Terminal front-end for the RBAC management backend")]
#[command(propagate_version = true)]
struct Cli {
    /// 对确认框自动回答“是”
    #[arg(short, long, global = true)]
    yes: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch a login captcha
    Captcha,

    /// Log in and persist the session
    Login {
        #[arg(short, long)]
        username: String,
        /// Prompted when omitted
        #[arg(short, long)]
        password: Option<String>,
        #[arg(long)]
        captcha: String,
        #[arg(long)]
        captcha_key: String,
        #[arg(long)]
        remember_me: bool,
    },

    /// Log out and clear the local session
    Logout,

    /// Show the current user, roles and permissions
    Whoami,

    /// Print the menu tree visible to the current user
    Menu,

    /// Navigate to a page and print where the router lands
    Open { path: String },

    /// List users
    Users(PageArgs),

    /// List roles
    Roles(PageArgs),

    /// Print the permission tree
    Permissions,

    /// List audit logs
    Logs {
        /// Login logs instead of operation logs
        #[arg(long)]
        login: bool,
        #[command(flatten)]
        page: PageArgs,
    },

    /// Show server and cache status
    Monitor,

    /// Show or change UI preferences
    Prefs {
        #[arg(long)]
        toggle_sidebar: bool,
        #[arg(long)]
        toggle_theme: bool,
        #[arg(long)]
        language: Option<String>,
        /// Window width used to derive the device class
        #[arg(long)]
        width: Option<u32>,
    },
}

#[derive(clap::Args, Debug)]
struct PageArgs {
    #[arg(long, default_value_t = 1)]
    page: u64,
    #[arg(long, default_value_t = 10)]
    size: u64,
    /// Filter by username / name
    #[arg(long)]
    name: Option<String>,
}

/// 终端提示：消息写到 stderr，确认框使用 dialoguer
struct TerminalNotifier {
    assume_yes: bool,
}

#[async_trait]
impl Notifier for TerminalNotifier {
    fn success(&self, message: &str) {
        eprintln!("✔ {}", message);
    }

    fn warning(&self, message: &str) {
        eprintln!("! {}", message);
    }

    fn error(&self, message: &str) {
        eprintln!("✘ {}", message);
    }

    async fn confirm(&self, title: &str, message: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        if !std::io::stdin().is_terminal() {
            tracing::warn!(title = %title, "No terminal for confirmation, declining");
            return false;
        }

        let prompt = format!("{}: {}", title, message);
        tokio::task::spawn_blocking(move || {
            dialoguer::Confirm::new()
                .with_prompt(prompt)
                .default(true)
                .interact()
                .unwrap_or(false)
        })
        .await
        .unwrap_or(false)
    }
}

fn load_env() {
    // 按优先级加载：.env.local > .env.development > .env
    if let Ok(env) = std::env::var("RBAC_ENV") {
        dotenv::from_filename(format!(".env.{}", env)).ok();
    } else {
        dotenv::from_filename(".env.local").ok();
        dotenv::from_filename(".env.development").ok();
        dotenv::dotenv().ok();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    load_env();

    let config = AppConfig::from_env().context("Failed to load configuration")?;
    telemetry::init_telemetry(&config.logging);

    let notifier = Arc::new(TerminalNotifier { assume_yes: cli.yes });
    let console = Console::from_config(config, notifier).context("Failed to initialize console")?;

    match cli.command {
        Commands::Captcha => {
            let captcha = console.session_store().get_captcha().await?;
            println!("key:   {}", captcha.captcha_key);
            println!("image: {}", captcha.captcha_image);
        }
        Commands::Login {
            username,
            password,
            captcha,
            captcha_key,
            remember_me,
        } => {
            let password = match password {
                Some(p) => p,
                None => dialoguer::Password::new()
                    .with_prompt("Password")
                    .interact()
                    .context("Failed to read password")?,
            };
            let request = LoginRequest {
                username,
                password,
                captcha,
                captcha_key,
                remember_me: Some(remember_me),
            };
            let response = console.session_store().login(&request).await?;
            println!("Logged in as {}", response.user.display_name());
        }
        Commands::Logout => console.logout().await,
        Commands::Whoami => whoami(&console).await?,
        Commands::Menu => {
            enter(&console, "/dashboard").await?;
            print_menu(&console.permission_store().menu_tree(), 0);
        }
        Commands::Open { path } => {
            let navigation = console.navigate(path.as_str()).await?;
            print_navigation(&console, &navigation);
        }
        Commands::Users(args) => {
            enter(&console, "/system/users").await?;
            let mut query = UserQuery::page(args.page, args.size);
            query.username = args.name;
            let page = console.users().page(&query).await?;
            for user in &page.records {
                let roles: Vec<_> = user.roles.iter().map(|r| r.role_code.as_str()).collect();
                println!(
                    "{:>6}  {:<16} {:<16} {:<14} {:?}  [{}]",
                    user.id,
                    user.username,
                    user.display_name(),
                    mask(&user.phone, 3, 4, '*'),
                    user.status,
                    roles.join(",")
                );
            }
            println!("page {}/{} (total {})", page.current, page.pages, format_number(page.total as i64));
        }
        Commands::Roles(args) => {
            enter(&console, "/system/roles").await?;
            let mut query = RoleQuery::page(args.page, args.size);
            query.role_name = args.name;
            let page = console.roles().page(&query).await?;
            for role in &page.records {
                println!("{:>6}  {:<20} {:<20} {:?}", role.id, role.role_code, role.role_name, role.status);
            }
            println!("page {}/{} (total {})", page.current, page.pages, format_number(page.total as i64));
        }
        Commands::Permissions => {
            enter(&console, "/system/permissions").await?;
            let tree = console.permissions().tree(&PermissionQuery::default()).await?;
            print_permissions(&tree, 0);
        }
        Commands::Logs { login, page } => {
            if login {
                enter(&console, "/logs/login").await?;
                let query = LoginLogQuery {
                    current: page.page,
                    size: page.size,
                    username: page.name,
                    ..Default::default()
                };
                let logs = console.logs().login_logs(&query).await?;
                for log in &logs.records {
                    let outcome = if log.succeeded() { "ok" } else { "failed" };
                    println!("{}  {:<16} {:<15} {:<6} {}", log.create_time, log.username, log.ip, outcome, log.message);
                }
            } else {
                enter(&console, "/logs/operation").await?;
                let query = OperationLogQuery {
                    current: page.page,
                    size: page.size,
                    username: page.name,
                    ..Default::default()
                };
                let logs = console.logs().operation_logs(&query).await?;
                for log in &logs.records {
                    println!(
                        "{}  {:<16} {:<24} {:>6}ms  {}",
                        log.create_time, log.username, log.operation, log.execute_time, log.method
                    );
                }
            }
        }
        Commands::Monitor => {
            enter(&console, "/monitor/server").await?;
            let system = console.system();
            let info = system.info().await?;
            println!("cpu     {} ({:.1}%)", info.cpu.name, info.cpu.usage);
            println!(
                "memory  {} / {} ({:.1}%)",
                format_file_size(info.memory.used),
                format_file_size(info.memory.total),
                info.memory.usage
            );
            println!(
                "disk    {} / {} ({:.1}%)",
                format_file_size(info.disk.used),
                format_file_size(info.disk.total),
                info.disk.usage
            );
            let stats = system.statistics().await?;
            println!(
                "users {}  roles {}  online {}  logins today {}",
                stats.user_count, stats.role_count, stats.online_user_count, stats.today_login_count
            );
            let online = system.online_users(PageQuery::default()).await?;
            println!("online sessions: {}", online.total);
        }
        Commands::Prefs {
            toggle_sidebar,
            toggle_theme,
            language,
            width,
        } => {
            let prefs = console.preferences();
            if toggle_sidebar {
                prefs.toggle_sidebar()?;
            }
            if toggle_theme {
                prefs.toggle_theme()?;
            }
            if let Some(language) = language {
                prefs.set_language(&language)?;
            }
            if let Some(width) = width {
                prefs.resize(width);
            }
            println!("sidebar collapsed: {}", prefs.sidebar_collapsed());
            println!("theme:             {}", if prefs.is_dark() { "dark" } else { "light" });
            println!("language:          {}", prefs.language());
            println!("device:            {:?}", prefs.device());
        }
    }

    Ok(())
}

/// 以页面导航的方式进入，守卫拒绝时报错
async fn enter(console: &Console, path: &str) -> anyhow::Result<Navigation> {
    let navigation = console.navigate(path).await?;
    if navigation.location.path != path {
        bail!("Cannot open {} (redirected to {})", path, navigation.location);
    }
    Ok(navigation)
}

async fn whoami(console: &Console) -> anyhow::Result<()> {
    let store = console.session_store();
    if !store.is_logged_in() {
        bail!("Not logged in");
    }
    if !console.session().permissions_loaded() {
        store.get_user_info().await?;
    }

    let Some(user) = console.session().profile() else {
        bail!("No user information");
    };
    println!("id:          {}", user.id);
    println!("username:    {}", user.username);
    println!("nickname:    {}", user.display_name());
    println!("email:       {}", user.email);
    let roles: Vec<_> = store.roles().into_iter().map(|r| r.role_code).collect();
    println!("roles:       {}", roles.join(", "));
    println!("super admin: {}", store.is_super_admin());

    let mut permissions: Vec<_> = console.session().permissions().into_iter().collect();
    permissions.sort();
    println!("permissions:");
    for code in permissions {
        println!("  {}", code);
    }
    Ok(())
}

fn print_navigation(console: &Console, navigation: &Navigation) {
    for hop in &navigation.redirects {
        println!("  via {}", hop);
    }
    println!("location: {}", navigation.location);
    println!("title:    {}", navigation.title);

    let crumbs: Vec<_> = console
        .preferences()
        .breadcrumbs()
        .into_iter()
        .map(|c| c.title)
        .collect();
    if !crumbs.is_empty() {
        println!("path:     {}", crumbs.join(" / "));
    }
}

fn print_menu(menus: &[MenuNode], depth: usize) {
    for menu in menus {
        if menu.hidden {
            continue;
        }
        println!("{}{} {}", "  ".repeat(depth), menu.title, menu.path);
        print_menu(&menu.children, depth + 1);
    }
}

fn print_permissions(nodes: &[PermissionNode], depth: usize) {
    for node in nodes {
        let state = if node.enabled { "" } else { " (disabled)" };
        println!("{}{} [{}]{}", "  ".repeat(depth), node.name, node.code, state);
        print_permissions(&node.children, depth + 1);
    }
}
