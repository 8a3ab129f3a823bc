use anyhow::bail;
use anyhow::Result;
use dialoguer::Confirm;
use dialoguer::Password;
use todoai_client::Credentials;
use todoai_term::application::render;
use todoai_term::domain::services::DashboardStatus;
use todoai_term::infrastructure::voice::VoiceManager;
use todoai_term::start_loop;
use todoai_term::AuthSession;
use todoai_term::ChatLoopProps;
use todoai_term::ChatWidget;
use todoai_term::ChatWidgetProps;
use todoai_term::ClientManager;
use todoai_term::Config;
use todoai_term::ConfigKey;
use todoai_term::Dashboard;
use todoai_term::RefreshSignal;
use tokio::io::BufReader;

const NOT_LOGGED_IN: &str = "You are not logged in. Run `todoai login` first.";

pub async fn login(email: String, password: Option<String>, register: bool) -> Result<()> {
    let clients = ClientManager::from_config()?;
    let session = AuthSession::new(clients.auth.clone(), clients.tokens());

    let password = match password {
        Some(password) => password,
        None => Password::new().with_prompt("Password").interact()?,
    };
    let credentials = Credentials { email, password };

    let response = if register {
        session.register(&credentials).await?
    } else {
        session.login(&credentials).await?
    };

    println!(
        "Logged in as {}.",
        response.email.as_deref().unwrap_or(&credentials.email)
    );
    Ok(())
}

pub async fn logout() -> Result<()> {
    let clients = ClientManager::from_config()?;
    AuthSession::new(clients.auth.clone(), clients.tokens())
        .logout()
        .await?;
    println!("Logged out.");
    Ok(())
}

pub async fn status() -> Result<()> {
    let clients = ClientManager::from_config()?;
    let session = AuthSession::new(clients.auth.clone(), clients.tokens());

    println!("Backend:    {}", clients.api.base_url());
    println!("Token file: {}", Config::get(ConfigKey::TokenFile));
    if session.is_authenticated().await {
        println!("Session:    logged in");
    } else {
        println!("Session:    not logged in");
    }
    Ok(())
}

/// Loads the task list, failing when the stored session is missing or stale.
async fn loaded_dashboard() -> Result<Dashboard> {
    let clients = ClientManager::from_config()?;
    let dashboard = Dashboard::new(clients.tasks.clone());

    if !dashboard.fetch_tasks().await {
        if dashboard.status().await == DashboardStatus::LoginRequired {
            bail!(NOT_LOGGED_IN);
        }
        bail!(dashboard.error().await.unwrap_or_default());
    }

    Ok(dashboard)
}

async fn finish(dashboard: &Dashboard, ok: bool, done: &str) -> Result<()> {
    if !ok {
        bail!(dashboard.error().await.unwrap_or_default());
    }

    println!("{done}");
    println!("{}", render::format_dashboard(&dashboard.snapshot().await));
    Ok(())
}

pub async fn list_tasks() -> Result<()> {
    let dashboard = loaded_dashboard().await?;
    println!("{}", render::format_dashboard(&dashboard.snapshot().await));
    Ok(())
}

pub async fn add_task(title: &str, description: &str) -> Result<()> {
    let dashboard = loaded_dashboard().await?;
    dashboard.set_new_task(title, description).await;
    let ok = dashboard.create_task().await;
    finish(&dashboard, ok, "Task added.").await
}

pub async fn edit_task(id: i64, title: Option<String>, description: Option<String>) -> Result<()> {
    let dashboard = loaded_dashboard().await?;
    let Some(task) = dashboard.tasks().await.into_iter().find(|t| t.id == id) else {
        bail!("Task {id} not found");
    };

    dashboard.start_edit(&task).await;
    dashboard
        .set_edit(
            &title.unwrap_or_else(|| task.title.clone()),
            &description.unwrap_or_else(|| task.description.clone().unwrap_or_default()),
        )
        .await;
    let ok = dashboard.save_edit().await;
    finish(&dashboard, ok, "Task updated.").await
}

pub async fn toggle_task(id: i64) -> Result<()> {
    let dashboard = loaded_dashboard().await?;
    let ok = dashboard.toggle_task(id).await;
    finish(&dashboard, ok, "Task toggled.").await
}

pub async fn delete_task(id: i64, yes: bool) -> Result<()> {
    let dashboard = loaded_dashboard().await?;

    if !yes {
        let confirmed = Confirm::new()
            .with_prompt("Delete this task?")
            .default(false)
            .interact()?;
        if !confirmed {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let ok = dashboard.delete_task(id).await;
    finish(&dashboard, ok, "Task deleted.").await
}

pub async fn chat() -> Result<()> {
    let clients = ClientManager::from_config()?;
    let refresh = RefreshSignal::new();

    let mut widget_props = ChatWidgetProps::new(clients.chat.clone(), refresh.clone());
    widget_props.history_policy = Config::history_policy()?;
    widget_props.recognizer = VoiceManager::get(&Config::get(ConfigKey::VoiceCommand));
    widget_props.voice_locale = Config::get(ConfigKey::VoiceLocale);

    let props = ChatLoopProps {
        widget: ChatWidget::new(widget_props),
        dashboard: Dashboard::new(clients.tasks.clone()),
        refresh,
    };

    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();
    start_loop(props, stdin, &mut stdout).await
}
