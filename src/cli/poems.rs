//! CLI poem browsing handlers.

use crate::auth::SessionCoordinator;
use crate::error::Result;
use crate::types::PageQuery;

use super::ListArgs;

/// Handle `stanza poems list`.
pub async fn handle_list(session: &SessionCoordinator, args: &ListArgs) -> Result<()> {
    let mut query = PageQuery::first(args.limit).with_page(args.page);
    if let Some(search) = &args.search {
        query = query.with_search(search).with_page(args.page);
    }
    query.category_id = args.category.clone();

    let page = session.client().list_poems(&query).await?;
    if page.is_empty() {
        println!("No poems found.");
        return Ok(());
    }
    for poem in &page.data {
        let author = poem
            .author
            .as_ref()
            .map(|a| a.display_name())
            .unwrap_or_else(|| "unknown".to_string());
        println!("  [{}] {} by {} (♥ {})", poem.id, poem.title, author, poem.likes_count);
    }
    println!("\nPage {} of {} ({} poems)", page.page, page.total_pages.max(1), page.total);
    if page.has_more() {
        println!("Next: stanza poems list --page {}", page.page + 1);
    }
    Ok(())
}

/// Handle `stanza poems show <id>`.
pub async fn handle_show(session: &SessionCoordinator, id: &str) -> Result<()> {
    let poem = session.client().get_poem(id).await?;
    println!("{}\n", poem.title);
    println!("{}", poem.content);
    if !poem.tags.is_empty() {
        println!("\n#{}", poem.tags.join(" #"));
    }
    Ok(())
}
