use std::fmt::Write;

use chrono::{DateTime, Local};

use crate::analysis::{Analysis, MIN_REVIEWS_FOR_TOP_RATED, TOP_BRANDS};

pub const DEFAULT_TITLE: &str = "Amazon Sponsored Products Analysis";

const TITLE_WIDTH: usize = 50;

fn truncate(title: &str) -> String {
    match title.char_indices().nth(TITLE_WIDTH) {
        Some((cut, _)) => format!("{}...", &title[..cut]),
        None => title.to_string(),
    }
}

fn cell(text: &str) -> String {
    text.replace('|', "\\|")
}

fn opt(value: Option<f64>, precision: usize) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.precision$}"))
}

/// Markdown report for a finished run. Never fails; an empty analysis gets
/// a short explanation instead of tables.
pub fn render_report(title: &str, analysis: &Analysis, generated_at: DateTime<Local>) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_report(&mut out, title, analysis, generated_at);
    out
}

fn write_report(
    out: &mut String,
    title: &str,
    a: &Analysis,
    generated_at: DateTime<Local>,
) -> std::fmt::Result {
    writeln!(out, "# {title}\n")?;
    writeln!(out, "*Generated on: {}*\n", generated_at.format("%Y-%m-%d %H:%M:%S"))?;
    writeln!(out, "*Total Products Analyzed: {}*\n", a.total_products)?;

    if a.is_empty() {
        writeln!(out, "No sponsored products were found. Likely causes:\n")?;
        writeln!(out, "1. The site blocked the requests")?;
        writeln!(out, "2. The result-page markup changed and the selectors need updating")?;
        writeln!(out, "3. There are genuinely no sponsored products for this search")?;
        return Ok(());
    }

    writeln!(out, "## 1. Brand Performance\n")?;
    if let Some(brand) = a.dominant_brand() {
        writeln!(out, "- Most sponsored listings come from **{}**", cell(brand))?;
    }
    if let Some(share) = a.top_brand_share {
        writeln!(
            out,
            "- The top {TOP_BRANDS} brands account for {share:.1}% of sponsored products"
        )?;
    }
    writeln!(out)?;

    writeln!(out, "### Products per Brand\n")?;
    writeln!(out, "| Brand | Products |")?;
    writeln!(out, "|-------|----------|")?;
    for b in a.brand_counts.iter().take(10) {
        writeln!(out, "| {} | {} |", cell(&b.brand), b.products)?;
    }
    writeln!(out)?;

    writeln!(out, "### Average Rating by Brand (Top 10)\n")?;
    writeln!(out, "| Brand | Average Rating |")?;
    writeln!(out, "|-------|----------------|")?;
    for b in a.brand_ratings.iter().take(10) {
        writeln!(out, "| {} | {:.2} |", cell(&b.brand), b.average_rating)?;
    }
    writeln!(out)?;

    writeln!(out, "## 2. Price vs Rating\n")?;
    writeln!(out, "### Average Price by Rating Range\n")?;
    writeln!(out, "| Rating Range | Products | Average Price |")?;
    writeln!(out, "|--------------|----------|---------------|")?;
    for bin in &a.rating_bins {
        writeln!(out, "| {} | {} | {} |", bin.label, bin.products, opt(bin.average_price, 2))?;
    }
    writeln!(out)?;

    writeln!(
        out,
        "### Value for Money (rating >= 4.0, price below median {})\n",
        opt(a.median_price, 2)
    )?;
    writeln!(out, "| Product | Brand | Rating | Price | Reviews |")?;
    writeln!(out, "|---------|-------|--------|-------|---------|")?;
    for p in &a.value_products {
        writeln!(
            out,
            "| {} | {} | {} | {} | {} |",
            cell(&truncate(&p.product_title)),
            cell(&p.brand),
            opt(p.rating, 1),
            opt(p.selling_price, 2),
            p.num_reviews
        )?;
    }
    writeln!(out)?;

    writeln!(out, "## 3. Reviews and Ratings\n")?;
    writeln!(out, "### Most Reviewed Products\n")?;
    writeln!(out, "| Product | Brand | Reviews |")?;
    writeln!(out, "|---------|-------|---------|")?;
    for p in &a.top_reviewed {
        writeln!(
            out,
            "| {} | {} | {} |",
            cell(&truncate(&p.product_title)),
            cell(&p.brand),
            p.num_reviews
        )?;
    }
    writeln!(out)?;

    writeln!(
        out,
        "### Highest Rated Products (at least {MIN_REVIEWS_FOR_TOP_RATED} reviews)\n"
    )?;
    writeln!(out, "| Product | Brand | Rating | Reviews |")?;
    writeln!(out, "|---------|-------|--------|---------|")?;
    for p in &a.top_rated {
        writeln!(
            out,
            "| {} | {} | {} | {} |",
            cell(&truncate(&p.product_title)),
            cell(&p.brand),
            opt(p.rating, 1),
            p.num_reviews
        )?;
    }
    writeln!(out)?;

    writeln!(out, "---")?;
    writeln!(out, "*Auto-generated from scraped search results*")?;
    Ok(())
}
