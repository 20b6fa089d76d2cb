use uuid::Uuid;

use crate::models::restaurant::Restaurant;
use crate::models::user::ROLE_ADMIN;
use crate::routes::auth::claims::Claims;

/// Literal role membership. No hierarchy: `ADMIN` does not imply `USER`.
pub fn authorize(claims: &Claims, role: &str) -> bool {
    claims.has_role(role)
}

pub fn is_owner_or_admin(claims: &Claims, owner_id: Uuid) -> bool {
    authorize(claims, ROLE_ADMIN) || claims.sub == owner_id.to_string()
}

pub fn can_manage_restaurant(claims: &Claims, restaurant: &Restaurant) -> bool {
    is_owner_or_admin(claims, restaurant.owner_user_id)
}
