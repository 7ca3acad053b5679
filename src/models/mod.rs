pub mod enquirymodel;
pub mod facademodel;
pub mod floorplanmodel;
pub mod listingmodel;
pub mod pagemodel;
pub mod quotemodel;
pub mod reviewmodel;
pub mod serviceareamodel;
pub mod settingmodel;
pub mod upgrademodel;
pub mod usermodel;
