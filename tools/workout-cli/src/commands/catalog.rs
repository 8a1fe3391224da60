//! Exercise catalog browsing.

use anyhow::{Context as _, Result};
use workout_core::catalog::ExerciseFilter;
use workout_sync::RemoteStore;

use super::CatalogArgs;
use crate::context::Context;

/// Run the catalog command.
pub async fn run(args: CatalogArgs, ctx: &Context) -> Result<()> {
    let mut filter = ExerciseFilter::new()
        .with_page(args.page)
        .with_limit(args.limit);
    if let Some(search) = &args.search {
        filter = filter.with_search(search.as_str());
    }

    let page = ctx
        .remote()
        .list_exercises(&filter)
        .await
        .context("Failed to load the exercise catalog")?;

    if ctx.output.is_json() {
        ctx.output.json(&page);
        return Ok(());
    }

    ctx.output.header("Exercises");
    if page.items.is_empty() {
        ctx.output.info("No exercises match");
        return Ok(());
    }

    let widths = [20, 32, 12];
    ctx.output.table_row(&["ID", "NAME", "EQUIPMENT"], &widths);
    for exercise in &page.items {
        ctx.output.table_row(
            &[
                exercise.id.as_str(),
                &exercise.name,
                exercise.equipment.as_deref().unwrap_or("-"),
            ],
            &widths,
        );
    }

    println!();
    ctx.output.kv(
        "Page",
        &format!(
            "{}/{} ({} total)",
            page.pagination.page, page.pagination.pages, page.pagination.total
        ),
    );
    if page.pagination.has_next() {
        ctx.output
            .info(&format!("More with --page {}", page.pagination.page + 1));
    }
    Ok(())
}
