mod health_check;
mod products;
mod users;

pub use health_check::health_check;
pub use health_check::root;
pub use products::{create_product, delete_product, get_product, list_products, update_product};
pub use users::{delete_me, get_me, get_user, list_users, sign_in, sign_up, update_me};
