pub mod enquirydtos;
pub mod facadedtos;
pub mod floorplandtos;
pub mod listingdtos;
pub mod pagedtos;
pub mod quotedtos;
pub mod reviewdtos;
pub mod serviceareadtos;
pub mod settingdtos;
pub mod upgradedtos;
pub mod userdtos;
