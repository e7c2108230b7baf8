use serde::Serialize;

use crate::database::db::{AppError, Repository};
use crate::models::models::{Banner, FaqArticle, Testimonial};

pub const DEFAULT_FAQ_CATEGORY: &str = "general";
pub const ALL_FAQ_CATEGORIES: &str = "all";

#[derive(Debug, Serialize)]
pub struct HomeContent {
    pub banners: Vec<Banner>,
    pub testimonials: Vec<Testimonial>,
}

#[derive(Debug, Serialize)]
pub struct FaqListing {
    pub articles: Vec<FaqArticle>,
    pub categories: Vec<String>,
    pub current_category: String,
}

pub fn home_content(db: &dyn Repository) -> Result<HomeContent, AppError> {
    Ok(HomeContent {
        banners: db.get_active_banners()?,
        testimonials: db.get_active_testimonials()?,
    })
}

/// FAQ articles for `requested`; a missing category means `general` and
/// `all` lists every active article.
pub fn faq_listing(db: &dyn Repository, requested: Option<&str>) -> Result<FaqListing, AppError> {
    let current_category = requested
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(DEFAULT_FAQ_CATEGORY)
        .to_string();

    let filter = if current_category == ALL_FAQ_CATEGORIES {
        None
    } else {
        Some(current_category.as_str())
    };

    Ok(FaqListing {
        articles: db.get_active_faq_articles(filter)?,
        categories: db.get_active_faq_categories()?,
        current_category,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory_db::MemoryDatabase;

    fn seeded() -> MemoryDatabase {
        let db = MemoryDatabase::new();
        db.seed_faq("How do I apply?", "general", true, 2);
        db.seed_faq("What is a wallet?", "general", true, 1);
        db.seed_faq("Interest rates", "loan", true, 1);
        db.seed_faq("Old question", "general", false, 0);
        db
    }

    fn titles(listing: &FaqListing) -> Vec<&str> {
        listing.articles.iter().map(|a| a.title.as_str()).collect()
    }

    #[test]
    fn defaults_to_general_category() {
        let listing = faq_listing(&seeded(), None).unwrap();
        assert_eq!(listing.current_category, "general");
        assert_eq!(titles(&listing), vec!["What is a wallet?", "How do I apply?"]);
        assert_eq!(listing.categories, vec!["general", "loan"]);
    }

    #[test]
    fn all_lists_every_active_article() {
        let listing = faq_listing(&seeded(), Some("all")).unwrap();
        assert_eq!(listing.current_category, "all");
        assert_eq!(listing.articles.len(), 3);
        assert!(listing.articles.iter().all(|a| a.is_active));
    }

    #[test]
    fn home_content_only_shows_active_rows_in_order() {
        let db = MemoryDatabase::new();
        db.seed_banner("Second", true, 2);
        db.seed_banner("First", true, 1);
        db.seed_banner("Hidden", false, 0);
        db.seed_testimonial("Siti", true, 1);
        db.seed_testimonial("Joko", false, 2);

        let home = home_content(&db).unwrap();
        let banners: Vec<&str> = home.banners.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(banners, vec!["First", "Second"]);
        assert_eq!(home.testimonials.len(), 1);
    }
}
