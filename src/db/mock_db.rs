use std::borrow::Cow;
use std::error::Error;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::error::{BoxDynError, DatabaseError};
use tokio::sync::OwnedMutexGuard;
use uuid::Uuid;

use super::restaurant_repository::{MenuUpsert, RestaurantRepository};
use super::user_repository::UserRepository;
use super::vote_repository::{VoteLedger, VoteTransaction};
use crate::models::restaurant::{Menu, NewRestaurant, Restaurant, UpsertMenu};
use crate::models::user::User;
use crate::models::vote::Vote;

/// Stand-in for a Postgres `unique_violation`.
#[derive(Debug)]
pub struct UniqueViolation {
    constraint: &'static str,
}

impl std::fmt::Display for UniqueViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "duplicate key value violates unique constraint \"{}\"", self.constraint)
    }
}

impl Error for UniqueViolation {}

impl DatabaseError for UniqueViolation {
    fn message(&self) -> &str {
        "duplicate key value violates unique constraint"
    }

    fn code(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed(super::UNIQUE_VIOLATION))
    }

    fn constraint(&self) -> Option<&str> {
        Some(self.constraint)
    }

    fn as_error(&self) -> &(dyn Error + Send + Sync + 'static) {
        self
    }

    fn as_error_mut(&mut self) -> &mut (dyn Error + Send + Sync + 'static) {
        self
    }

    fn into_error(self: Box<Self>) -> BoxDynError {
        self
    }

    fn kind(&self) -> sqlx::error::ErrorKind {
        sqlx::error::ErrorKind::UniqueViolation
    }
}

pub fn unique_violation(constraint: &'static str) -> sqlx::Error {
    sqlx::Error::Database(Box::new(UniqueViolation { constraint }))
}

fn mock_failure() -> sqlx::Error {
    sqlx::Error::Protocol("Mock DB failure".into())
}

pub struct MockDb {
    pub users: Mutex<Vec<User>>,
    pub should_fail: bool,
}

impl Default for MockDb {
    fn default() -> Self {
        Self {
            users: Mutex::new(vec![]),
            should_fail: false,
        }
    }
}

impl MockDb {
    pub fn with_users(users: Vec<User>) -> Self {
        Self {
            users: Mutex::new(users),
            ..Default::default()
        }
    }

    /// The two seeded accounts, both with password `gophers`.
    pub fn seeded() -> Self {
        Self::with_users(vec![fixtures::admin(), fixtures::user()])
    }
}

#[async_trait]
impl UserRepository for MockDb {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        if self.should_fail {
            return Err(mock_failure());
        }
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_id(&self, user_id: Uuid) -> Result<Option<User>, sqlx::Error> {
        if self.should_fail {
            return Err(mock_failure());
        }
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.id == user_id).cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>, sqlx::Error> {
        if self.should_fail {
            return Err(mock_failure());
        }
        Ok(self.users.lock().unwrap().clone())
    }

    async fn create_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
        roles: &[String],
    ) -> Result<User, sqlx::Error> {
        if self.should_fail {
            return Err(mock_failure());
        }
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == email) {
            return Err(unique_violation("users_email_key"));
        }
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            roles: roles.to_vec(),
            created_at: now,
            updated_at: now,
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn update_user(&self, user: &User) -> Result<Option<User>, sqlx::Error> {
        if self.should_fail {
            return Err(mock_failure());
        }
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == user.email && u.id != user.id) {
            return Err(unique_violation("users_email_key"));
        }
        let Some(existing) = users.iter_mut().find(|u| u.id == user.id) else {
            return Ok(None);
        };
        *existing = User {
            updated_at: Utc::now(),
            ..user.clone()
        };
        Ok(Some(existing.clone()))
    }

    async fn delete_user(&self, user_id: Uuid) -> Result<bool, sqlx::Error> {
        if self.should_fail {
            return Err(mock_failure());
        }
        let mut users = self.users.lock().unwrap();
        let before = users.len();
        users.retain(|u| u.id != user_id);
        Ok(users.len() != before)
    }

    async fn status_check(&self) -> Result<(), sqlx::Error> {
        if self.should_fail {
            return Err(mock_failure());
        }
        Ok(())
    }
}

#[derive(Debug, Default, Clone)]
pub struct StoreData {
    pub restaurants: Vec<Restaurant>,
    pub menus: Vec<Menu>,
    pub votes: Vec<Vote>,
}

/// In-memory restaurants, menus and vote ledger behind one async mutex. A vote
/// transaction holds the lock from `begin` to commit or drop and works on a
/// staged copy, so an uncommitted transaction never leaks a write.
#[derive(Clone, Default)]
pub struct MockRestaurantDb {
    data: Arc<tokio::sync::Mutex<StoreData>>,
    pub should_fail: bool,
}

impl MockRestaurantDb {
    pub fn seeded() -> Self {
        let data = StoreData {
            restaurants: fixtures::restaurants(),
            menus: fixtures::menus(),
            votes: vec![],
        };
        Self {
            data: Arc::new(tokio::sync::Mutex::new(data)),
            should_fail: false,
        }
    }

    pub async fn menu_votes(&self, menu_id: Uuid) -> Option<i32> {
        let data = self.data.lock().await;
        data.menus.iter().find(|m| m.id == menu_id).map(|m| m.votes)
    }

    pub async fn vote_count(&self) -> usize {
        self.data.lock().await.votes.len()
    }
}

#[async_trait]
impl RestaurantRepository for MockRestaurantDb {
    async fn list_restaurants(&self) -> Result<Vec<Restaurant>, sqlx::Error> {
        if self.should_fail {
            return Err(mock_failure());
        }
        Ok(self.data.lock().await.restaurants.clone())
    }

    async fn find_restaurant(
        &self,
        restaurant_id: Uuid,
    ) -> Result<Option<Restaurant>, sqlx::Error> {
        if self.should_fail {
            return Err(mock_failure());
        }
        let data = self.data.lock().await;
        Ok(data
            .restaurants
            .iter()
            .find(|r| r.id == restaurant_id)
            .cloned())
    }

    async fn create_restaurant(
        &self,
        owner_user_id: Uuid,
        restaurant: &NewRestaurant,
    ) -> Result<Restaurant, sqlx::Error> {
        if self.should_fail {
            return Err(mock_failure());
        }
        let now = Utc::now();
        let created = Restaurant {
            id: Uuid::new_v4(),
            name: restaurant.name.clone(),
            address: restaurant.address.clone(),
            owner_user_id,
            created_at: now,
            updated_at: now,
        };
        self.data.lock().await.restaurants.push(created.clone());
        Ok(created)
    }

    async fn delete_restaurant(&self, restaurant_id: Uuid) -> Result<bool, sqlx::Error> {
        if self.should_fail {
            return Err(mock_failure());
        }
        let mut data = self.data.lock().await;
        let before = data.restaurants.len();
        data.restaurants.retain(|r| r.id != restaurant_id);
        let removed = data.restaurants.len() != before;
        if removed {
            data.menus.retain(|m| m.restaurant_id != restaurant_id);
            data.votes.retain(|v| v.restaurant_id != restaurant_id);
        }
        Ok(removed)
    }

    async fn list_menus_for_restaurant(
        &self,
        restaurant_id: Uuid,
    ) -> Result<Vec<Menu>, sqlx::Error> {
        if self.should_fail {
            return Err(mock_failure());
        }
        let data = self.data.lock().await;
        let mut menus: Vec<Menu> = data
            .menus
            .iter()
            .filter(|m| m.restaurant_id == restaurant_id)
            .cloned()
            .collect();
        menus.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(menus)
    }

    async fn find_menu(
        &self,
        restaurant_id: Uuid,
        menu_id: Uuid,
    ) -> Result<Option<Menu>, sqlx::Error> {
        if self.should_fail {
            return Err(mock_failure());
        }
        let data = self.data.lock().await;
        Ok(data
            .menus
            .iter()
            .find(|m| m.id == menu_id && m.restaurant_id == restaurant_id)
            .cloned())
    }

    async fn list_menus_by_date(&self, date: NaiveDate) -> Result<Vec<Menu>, sqlx::Error> {
        if self.should_fail {
            return Err(mock_failure());
        }
        let data = self.data.lock().await;
        Ok(data.menus.iter().filter(|m| m.date == date).cloned().collect())
    }

    async fn upsert_menu(
        &self,
        restaurant_id: Uuid,
        menu: &UpsertMenu,
    ) -> Result<MenuUpsert, sqlx::Error> {
        if self.should_fail {
            return Err(mock_failure());
        }
        let mut data = self.data.lock().await;

        let existing = match menu.id {
            Some(id) => {
                if data
                    .menus
                    .iter()
                    .any(|m| m.id != id && m.restaurant_id == restaurant_id && m.date == menu.date)
                {
                    return Err(unique_violation("menu_restaurant_id_date_key"));
                }
                let found = data
                    .menus
                    .iter_mut()
                    .find(|m| m.id == id && m.restaurant_id == restaurant_id)
                    .ok_or(sqlx::Error::RowNotFound)?;
                Some(found)
            }
            None => data
                .menus
                .iter_mut()
                .find(|m| m.restaurant_id == restaurant_id && m.date == menu.date),
        };

        if let Some(existing) = existing {
            existing.date = menu.date;
            existing.content = menu.content.clone();
            return Ok(MenuUpsert::Updated(existing.clone()));
        }

        let created = Menu {
            id: Uuid::new_v4(),
            restaurant_id,
            date: menu.date,
            content: menu.content.clone(),
            votes: 0,
        };
        data.menus.push(created.clone());
        Ok(MenuUpsert::Created(created))
    }
}

pub struct MockVoteTransaction {
    guard: OwnedMutexGuard<StoreData>,
    staged: StoreData,
}

#[async_trait]
impl VoteLedger for MockRestaurantDb {
    async fn begin(&self) -> Result<Box<dyn VoteTransaction>, sqlx::Error> {
        if self.should_fail {
            return Err(mock_failure());
        }
        let guard = self.data.clone().lock_owned().await;
        let staged = guard.clone();
        Ok(Box::new(MockVoteTransaction { guard, staged }))
    }

    async fn menus_with_votes(&self, date: NaiveDate) -> Result<Vec<Menu>, sqlx::Error> {
        if self.should_fail {
            return Err(mock_failure());
        }
        let data = self.data.lock().await;
        let mut menus: Vec<Menu> = data.menus.iter().filter(|m| m.date == date).cloned().collect();
        menus.sort_by(|a, b| {
            b.votes
                .cmp(&a.votes)
                .then_with(|| a.restaurant_id.cmp(&b.restaurant_id))
        });
        Ok(menus)
    }
}

#[async_trait]
impl VoteTransaction for MockVoteTransaction {
    async fn count_votes(&mut self, date: NaiveDate, user_id: Uuid) -> Result<i64, sqlx::Error> {
        Ok(self
            .staged
            .votes
            .iter()
            .filter(|v| v.date == date && v.user_id == user_id)
            .count() as i64)
    }

    async fn insert_vote(&mut self, vote: &Vote) -> Result<(), sqlx::Error> {
        if self
            .staged
            .votes
            .iter()
            .any(|v| v.date == vote.date && v.user_id == vote.user_id)
        {
            return Err(unique_violation("vote_pkey"));
        }
        self.staged.votes.push(vote.clone());
        Ok(())
    }

    async fn increment_menu_votes(&mut self, menu_id: Uuid) -> Result<u64, sqlx::Error> {
        match self.staged.menus.iter_mut().find(|m| m.id == menu_id) {
            Some(menu) => {
                menu.votes += 1;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn commit(self: Box<Self>) -> Result<(), sqlx::Error> {
        let MockVoteTransaction { mut guard, staged } = *self;
        *guard = staged;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), sqlx::Error> {
        Ok(())
    }
}

/// Seed-shaped records shared by tests.
pub mod fixtures {
    use std::sync::OnceLock;

    use chrono::{NaiveDate, Utc};
    use uuid::Uuid;

    use crate::models::restaurant::{Menu, Restaurant};
    use crate::models::user::{User, ROLE_ADMIN, ROLE_USER};
    use crate::utils::password::hash_password;

    pub const PASSWORD: &str = "gophers";
    pub const ADMIN_ID: Uuid = Uuid::from_u128(0x5cf37266_3473_4006_984f_9325122678b7);
    pub const USER_ID: Uuid = Uuid::from_u128(0x45b5fbd3_755f_4379_8f07_a58d4a30fa2f);
    pub const LOKYS_RESTAURANT: Uuid = Uuid::from_u128(0x5828612a_1f8a_403c_b6d1_6cb66fbf0c66);
    pub const LOKYS_MENU_1: Uuid = Uuid::from_u128(0x4058d981_0df1_45de_807e_b8e90bcb2d80);
    pub const LOKYS_MENU_2: Uuid = Uuid::from_u128(0xf70a7f9a_e41a_47e5_b56c_444646df77bc);

    /// Hashed once per test binary; argon2 is slow in debug builds.
    pub fn password_hash() -> &'static str {
        static HASH: OnceLock<String> = OnceLock::new();
        HASH.get_or_init(|| hash_password(PASSWORD).unwrap())
    }

    pub fn admin() -> User {
        User {
            id: ADMIN_ID,
            name: "Admin Gopher".into(),
            email: "admin@example.com".into(),
            password_hash: password_hash().to_string(),
            roles: vec![ROLE_ADMIN.into(), ROLE_USER.into()],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    pub fn user() -> User {
        User {
            id: USER_ID,
            name: "User Gopher".into(),
            email: "user@example.com".into(),
            password_hash: password_hash().to_string(),
            roles: vec![ROLE_USER.into()],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    pub fn restaurants() -> Vec<Restaurant> {
        vec![Restaurant {
            id: LOKYS_RESTAURANT,
            name: "Lokys".into(),
            address: "Stiklių g. 10, Vilnius 01131".into(),
            owner_user_id: ADMIN_ID,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }]
    }

    pub fn menus() -> Vec<Menu> {
        vec![
            Menu {
                id: LOKYS_MENU_1,
                restaurant_id: LOKYS_RESTAURANT,
                date: NaiveDate::from_ymd_opt(2020, 3, 1).unwrap(),
                content: "Lokys menu for 2020-03-01".into(),
                votes: 0,
            },
            Menu {
                id: LOKYS_MENU_2,
                restaurant_id: LOKYS_RESTAURANT,
                date: NaiveDate::from_ymd_opt(2020, 3, 2).unwrap(),
                content: "Lokys menu for 2020-03-02".into(),
                votes: 0,
            },
        ]
    }
}
