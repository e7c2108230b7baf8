use actix_web::web;

use crate::routes::routes::{
    dashboard_handler, faq_handler, get_profile_handler, get_wallet_handler,
    health_check_handler, loan_application_handler, store_profile_handler,
    update_profile_handler, verify_profile_handler, welcome_handler, withdraw_handler,
};

pub fn config(conf: &mut web::ServiceConfig) {
    // Public pages.
    conf.service(welcome_handler)
        .service(health_check_handler);

    // Session required; enforced by the handlers' auth extractor.
    conf.service(dashboard_handler)
        .service(faq_handler)
        .service(get_wallet_handler)
        .service(withdraw_handler)
        .service(get_profile_handler)
        .service(verify_profile_handler)
        .service(store_profile_handler)
        .service(update_profile_handler)
        .service(loan_application_handler);
}
