use color_eyre::eyre::{Result, WrapErr};
use diary_client::api::HttpNotesApi;
use diary_client::app::{Action, App};
use diary_client::config::Config;
use diary_client::logging;
use diary_client::ui::{self, UI};
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

#[tokio::main]
async fn main() -> Result<()> {
    ui::install_hooks()?;

    let config = Config::from_env()?;
    logging::init(&config)?;
    let api = HttpNotesApi::new(&config.api_url).wrap_err("failed to set up the notes client")?;

    let mut app = App::new();
    let mut ui = UI::new()?;

    app.set_pending(Action::Reload.pending_label());
    ui.display(&app)?;
    app.perform(&api, Action::Reload).await;

    while app.is_running() {
        app.tick(Instant::now());
        ui.display(&app)?;

        if let Some(key) = ui.next_key(POLL_INTERVAL)? {
            if let Some(action) = app.handle_key(key) {
                if let Some(label) = action.pending_label() {
                    app.set_pending(Some(label));
                    ui.display(&app)?;
                }
                app.perform(&api, action).await;
                ui.discard_pending_input()?;
            }
        }
    }

    tracing::info!("diary client stopped");
    Ok(())
}
