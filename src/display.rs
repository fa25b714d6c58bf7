use crate::core::error::HomechatError;
use crate::home::Lamp;
use crate::tools::ToolOutcome;
use console::style;
use std::sync::atomic::{AtomicU8, Ordering};

/// How much tool activity is shown alongside replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    Verbose,
    Minimal,
    Hidden,
}

static DISPLAY_MODE: AtomicU8 = AtomicU8::new(1);

pub fn set_display_mode(mode: DisplayMode) {
    let value = match mode {
        DisplayMode::Verbose => 0,
        DisplayMode::Minimal => 1,
        DisplayMode::Hidden => 2,
    };
    DISPLAY_MODE.store(value, Ordering::Relaxed);
}

pub fn display_mode() -> DisplayMode {
    match DISPLAY_MODE.load(Ordering::Relaxed) {
        0 => DisplayMode::Verbose,
        2 => DisplayMode::Hidden,
        _ => DisplayMode::Minimal,
    }
}

pub fn display_mode_help() {
    println!("{}", style("Display modes").bold().underlined());
    println!("  {}  show every tool call with its arguments and result", style("verbose").cyan());
    println!("  {}  one line per tool call (default)", style("minimal").cyan());
    println!("  {}   hide tool activity", style("hidden").cyan());
}

fn looks_like_markdown(text: &str) -> bool {
    text.contains("```") || text.contains('*') || text.contains('`') || text.contains('#')
}

/// Prints the assistant's reply.
pub fn display_reply(reply: &str) {
    println!("\n{}", style("🤖 Eva").bold().blue());
    if looks_like_markdown(reply) {
        termimad::MadSkin::default().print_text(reply);
    } else {
        println!("{}", style(reply).white());
    }
}

pub fn display_tool_activity(outcomes: &[ToolOutcome]) {
    let mode = display_mode();
    if mode == DisplayMode::Hidden {
        return;
    }

    for outcome in outcomes {
        let marker = if outcome.is_error() {
            style("✗").red().bold()
        } else {
            style("✓").green().bold()
        };
        match mode {
            DisplayMode::Verbose => {
                println!(
                    "{} {} {}",
                    marker,
                    style(&outcome.call.name).cyan(),
                    style(&outcome.call.arguments).dim()
                );
                println!("    {}", style(outcome.content()).dim());
            }
            _ => println!("{} {}", marker, style(&outcome.call.name).cyan()),
        }
    }
}

/// Shown in place of a reply when the turn failed.
pub fn display_error(error: &HomechatError) {
    let label = if error.is_service_failure() {
        "⚠️  No reply from the assistant:"
    } else {
        "⚠️  Error:"
    };
    eprintln!("{} {}", style(label).bold().red(), style(error).red());
}

pub fn format_lamps(lamps: &[Lamp]) -> String {
    if lamps.is_empty() {
        return "No lamps.".to_string();
    }
    lamps
        .iter()
        .map(|lamp| {
            let state = if lamp.on {
                style("on").green().bold()
            } else {
                style("off").dim()
            };
            format!("💡 {} {}", lamp.name, state)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
