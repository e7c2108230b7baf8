use super::db::{AppError, Database, DbAccess};
use crate::models::models::{Banner, FaqArticle, Testimonial};
use crate::models::schema::{banners, faq_articles, testimonials};
use diesel::prelude::*;

pub trait ContentImpl {
    fn get_active_banners(&self) -> Result<Vec<Banner>, AppError>;

    fn get_active_testimonials(&self) -> Result<Vec<Testimonial>, AppError>;

    /// Active articles ordered by `sort_order`; `None` means every category.
    fn get_active_faq_articles(&self, category: Option<&str>) -> Result<Vec<FaqArticle>, AppError>;

    fn get_active_faq_categories(&self) -> Result<Vec<String>, AppError>;
}

impl ContentImpl for Database {
    fn get_active_banners(&self) -> Result<Vec<Banner>, AppError> {
        let mut conn = self.conn()?;
        banners::table
            .filter(banners::is_active.eq(true))
            .order(banners::sort_order.asc())
            .load::<Banner>(&mut conn)
            .map_err(AppError::DieselError)
    }

    fn get_active_testimonials(&self) -> Result<Vec<Testimonial>, AppError> {
        let mut conn = self.conn()?;
        testimonials::table
            .filter(testimonials::is_active.eq(true))
            .order(testimonials::sort_order.asc())
            .load::<Testimonial>(&mut conn)
            .map_err(AppError::DieselError)
    }

    fn get_active_faq_articles(&self, category: Option<&str>) -> Result<Vec<FaqArticle>, AppError> {
        let mut conn = self.conn()?;
        let mut query = faq_articles::table
            .filter(faq_articles::is_active.eq(true))
            .into_boxed();

        if let Some(category) = category {
            query = query.filter(faq_articles::category.eq(category));
        }

        query
            .order(faq_articles::sort_order.asc())
            .load::<FaqArticle>(&mut conn)
            .map_err(AppError::DieselError)
    }

    fn get_active_faq_categories(&self) -> Result<Vec<String>, AppError> {
        let mut conn = self.conn()?;
        faq_articles::table
            .filter(faq_articles::is_active.eq(true))
            .select(faq_articles::category)
            .distinct()
            .order(faq_articles::category.asc())
            .load::<String>(&mut conn)
            .map_err(AppError::DieselError)
    }
}
