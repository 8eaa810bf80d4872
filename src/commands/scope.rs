use anyhow::{Context as _, Result, bail};
use colored::Colorize;
use declarative::{Engine, Scope, ScopeStatus, TeardownReport, TeardownResult};

use crate::Context;
use crate::cli::{DeleteArgs, DestroyArgs, ScopeArgs, ScopesArgs};
use crate::progress::TeardownProgress;
use crate::ui;

/// Delete one resource from a scope
pub fn delete(ctx: &Context, args: DeleteArgs) -> Result<()> {
    let scope_name = ctx.settings.scope_name(args.scope.scope.as_deref());
    let mut scope = ctx.store.load(&scope_name)?;
    let registry = super::registry(ctx)?;
    let engine = Engine::new(&registry);

    let result = engine
        .delete(&mut scope, &args.id)
        .with_context(|| format!("Failed to delete '{}'", args.id))?;
    ctx.store.save(&scope)?;

    match &result {
        TeardownResult::Destroyed => {
            ui::success(&format!("Deleted '{}' from scope '{}'", args.id.bold(), scope_name));
        }
        TeardownResult::Skipped { reason } => {
            ui::info(&format!("Removed '{}' ({})", args.id, reason));
        }
        TeardownResult::Failed { error } => {
            ui::error(&format!("'{}' removed from scope but its handler failed: {}", args.id, error));
            bail!("Delete of '{}' did not complete cleanly", args.id);
        }
    }
    Ok(())
}

/// Tear down a whole scope, last created first
pub fn destroy(ctx: &Context, args: DestroyArgs) -> Result<()> {
    let scope_name = ctx.settings.scope_name(args.scope.scope.as_deref());
    let mut scope = ctx.store.load(&scope_name)?;

    if scope.status() == ScopeStatus::Destroyed {
        ui::info(&format!("Scope '{}' is already destroyed", scope_name));
        return Ok(());
    }

    if !ctx.quiet {
        ui::header(&format!("Destroy scope {}", scope_name));
        for instance in scope.instances().iter().rev() {
            println!(
                "  {} {} {}",
                "-".red(),
                instance.id().bold(),
                format!("({})", instance.resource_type()).dimmed()
            );
        }
        println!();
    }

    if !args.yes && !scope.is_empty() && !confirm_destroy(&scope)? {
        ui::info("Aborted");
        return Ok(());
    }

    let registry = super::registry(ctx)?;
    let engine = Engine::new(&registry);
    let mut progress = TeardownProgress::new(ctx.quiet);
    let report = engine.destroy_with(&mut scope, &mut progress);
    ctx.store.save(&scope)?;

    print_summary(&report, ctx.quiet);
    if !report.is_success() {
        bail!(
            "{} failed to tear down cleanly",
            ui::plural(report.failed(), "resource")
        );
    }
    Ok(())
}

/// List persisted scopes, optionally pruning destroyed ones
pub fn list(ctx: &Context, args: ScopesArgs) -> Result<()> {
    let mut summaries = ctx.store.list()?;

    if args.prune {
        let mut pruned = 0;
        for summary in summaries.iter().filter(|s| s.status == ScopeStatus::Destroyed) {
            if ctx.store.remove(&summary.name)? {
                log::info!("Removed destroyed scope '{}'", summary.name);
                pruned += 1;
            }
        }
        summaries.retain(|s| s.status != ScopeStatus::Destroyed);
        ui::success(&format!("Pruned {}", ui::plural(pruned, "destroyed scope")));
    }

    if summaries.is_empty() {
        ui::info("No scopes yet");
        ui::dim("Run: converge user apply <ID> --org-id <ORG> --first-name <NAME> --last-name <NAME>");
        return Ok(());
    }

    ui::header("Scopes");
    for summary in &summaries {
        let marker = if summary.name == ctx.settings.default_scope {
            "*".cyan().to_string()
        } else {
            " ".to_string()
        };
        println!(
            "{} {:<24} {:<12} {}",
            marker,
            summary.name.bold(),
            ui::scope_status(summary.status),
            ui::plural(summary.resources, "resource").dimmed()
        );
    }
    println!();
    ui::dim(&format!("State: {}", ctx.store.scopes_dir().display()));
    Ok(())
}

/// Show the resources tracked by a scope
pub fn status(ctx: &Context, args: ScopeArgs) -> Result<()> {
    let scope_name = ctx.settings.scope_name(args.scope.as_deref());
    if !ctx.store.exists(&scope_name) {
        ui::info(&format!("Scope '{}' has not been created yet", scope_name));
        return Ok(());
    }
    let scope = ctx.store.load(&scope_name)?;
    print_scope(&scope, ctx.verbose > 0);
    Ok(())
}

fn print_scope(scope: &Scope, detailed: bool) {
    ui::header(&format!("Scope {}", scope.name()));
    ui::kv("Status", &ui::scope_status(scope.status()).to_string());
    ui::kv("Resources", &scope.len().to_string());
    ui::kv("Created", &scope.created_at().to_rfc3339());
    ui::kv("Updated", &scope.updated_at().to_rfc3339());

    if scope.is_empty() {
        return;
    }

    ui::section("Resources");
    for instance in scope.instances() {
        let external_id = instance
            .output()
            .and_then(|o| o.get("id"))
            .and_then(|v| v.as_str())
            .unwrap_or("-");
        println!(
            "  {} {:<20} {:<24} {}",
            if instance.output().is_some() {
                "●".green()
            } else {
                "○".dimmed()
            },
            instance.id().bold(),
            instance.resource_type(),
            external_id.dimmed()
        );
        if detailed {
            ui::dim(&format!(
                "    last {} at {}",
                instance.phase(),
                instance.updated_at().to_rfc3339()
            ));
        }
    }
    println!();
}

fn confirm_destroy(scope: &Scope) -> Result<bool> {
    use dialoguer::Confirm;

    let confirmed = Confirm::new()
        .with_prompt(format!(
            "Destroy {} in scope '{}'?",
            ui::plural(scope.len(), "resource"),
            scope.name()
        ))
        .default(false)
        .interact()?;

    Ok(confirmed)
}

fn print_summary(report: &TeardownReport, quiet: bool) {
    if quiet && report.is_success() {
        return;
    }
    println!();
    if report.is_success() {
        ui::success(&format!(
            "Scope '{}' destroyed ({} destroyed, {} skipped)",
            report.scope,
            report.destroyed(),
            report.skipped()
        ));
    } else {
        ui::warn(&format!(
            "Scope '{}' destroyed with errors ({} destroyed, {} skipped, {} failed)",
            report.scope,
            report.destroyed(),
            report.skipped(),
            report.failed()
        ));
        for entry in report.failures() {
            ui::dim(&format!(
                "{} ({}): {}",
                entry.id,
                entry.resource_type,
                ui::teardown_result(&entry.result)
            ));
        }
    }
}
