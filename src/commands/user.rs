use anyhow::{Context as _, Result};
use colored::Colorize;
use declarative::Engine;
use platform::{User, UserProps, UserResource};

use super::UserApi;
use crate::Context;
use crate::cli::{UserApplyArgs, UserGetArgs};
use crate::ui;

/// Create or update a user, then persist the scope
pub fn apply(ctx: &Context, args: UserApplyArgs) -> Result<()> {
    let scope_name = ctx.settings.scope_name(args.scope.scope.as_deref());
    let mut scope = ctx.store.load_or_new(&scope_name)?;
    let registry = super::registry(ctx)?;
    let engine = Engine::new(&registry);

    let existed = scope.get(&args.id).is_some_and(|i| i.output().is_some());
    let props = UserProps {
        org_id: args.org_id,
        first_name: args.first_name,
        last_name: args.last_name,
        fun_fact: args.fun_fact,
    };

    let user = engine
        .apply::<UserApi>(&mut scope, &args.id, &props)
        .with_context(|| format!("Failed to apply user '{}'", args.id))?;
    ctx.store.save(&scope)?;

    if !ctx.quiet {
        let verb = if existed { "Updated" } else { "Created" };
        ui::success(&format!(
            "{} user '{}' in scope '{}'",
            verb,
            args.id.bold(),
            scope_name
        ));
        print_user(&user);
    }
    Ok(())
}

/// Show the stored output of a user and what the platform says now
pub fn get(ctx: &Context, args: UserGetArgs) -> Result<()> {
    let scope_name = ctx.settings.scope_name(args.scope.scope.as_deref());
    let scope = ctx.store.load(&scope_name)?;

    let instance = scope
        .get(&args.id)
        .with_context(|| format!("No resource '{}' in scope '{}'", args.id, scope_name))?;
    let user: User = instance
        .output_as()?
        .with_context(|| format!("User '{}' was never created", args.id))?;

    ui::header(&format!("User {}", args.id));
    ui::section("Stored");
    print_user(&user);
    ui::kv("Last phase", instance.phase().as_str());
    ui::kv("Updated", &instance.updated_at().to_rfc3339());

    ui::section("Live");
    let api = UserResource::new(super::api_client(ctx));
    match api.fetch(&user.org_id, &user.id) {
        Ok(Some(record)) => {
            ui::kv("First name", &record.first_name);
            ui::kv("Last name", &record.last_name);
            if let Some(fact) = &record.fun_fact {
                ui::kv("Fun fact", fact);
            }
            if record.first_name != user.first_name
                || record.last_name != user.last_name
                || record.fun_fact != user.fun_fact
            {
                ui::warn("Live record differs from the stored output; re-apply to converge");
            }
        }
        Ok(None) => ui::warn("Not found on the platform (404)"),
        Err(e) if e.is_retryable() => {
            ui::warn(&format!("Lookup failed ({}): {}", e.category(), e));
            ui::dim("This is usually transient; try again");
        }
        Err(e) => ui::error(&format!("Lookup failed ({}): {}", e.category(), e)),
    }

    println!();
    Ok(())
}

fn print_user(user: &User) {
    ui::kv("Id", &user.id);
    ui::kv("Org", &user.org_id);
    ui::kv("Name", &format!("{} {}", user.first_name, user.last_name));
    if let Some(fact) = &user.fun_fact {
        ui::kv("Fun fact", fact);
    }
    if let Some(created) = chrono::DateTime::from_timestamp_millis(user.created_at) {
        ui::kv("Created", &created.to_rfc3339());
    }
}
