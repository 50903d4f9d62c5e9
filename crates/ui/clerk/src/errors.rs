use std::sync::OnceLock;

use color_eyre::Result;
use tracing::error;

static HOOKS: OnceLock<()> = OnceLock::new();

/// Installs the eyre report hook and a panic handler that puts the
/// terminal back together before anything is printed.
pub fn init() -> Result<()> {
    if HOOKS.get().is_some() {
        return Ok(());
    }

    let (panic_hook, eyre_hook) = color_eyre::config::HookBuilder::default()
        .panic_section("clerk crashed. the log file in the data directory has the details.")
        .capture_span_trace_by_default(false)
        .display_location_section(false)
        .display_env_section(false)
        .try_into_hooks()?;
    eyre_hook.install()?;

    std::panic::set_hook(Box::new(move |panic_info| {
        // raw mode would garble everything printed below
        if let Err(err) = crate::tui::restore_terminal() {
            error!("failed to restore the terminal: {err:?}");
        }

        let report = panic_hook.panic_report(panic_info).to_string();
        error!("panic: {}", strip_ansi_escapes::strip_str(&report));

        #[cfg(debug_assertions)]
        better_panic::Settings::auto()
            .most_recent_first(false)
            .verbosity(better_panic::Verbosity::Full)
            .create_panic_handler()(panic_info);

        #[cfg(not(debug_assertions))]
        {
            use human_panic::{handle_dump, metadata, print_msg};
            let meta = metadata!();
            let dump = handle_dump(&meta, panic_info);
            print_msg(dump, &meta)
                .expect("human-panic: printing error message to console failed");
            eprintln!("{report}");
        }

        std::process::exit(libc::EXIT_FAILURE);
    }));

    let _ = HOOKS.set(());
    Ok(())
}
