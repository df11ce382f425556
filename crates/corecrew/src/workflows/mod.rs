pub mod hiring;
pub mod outreach;
pub mod site;
