//! Tree and user records, and the in-memory store standing in for a database.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::info;

use crate::error::StoreError;

pub const DEFAULT_TREE_IMAGE: &str =
    "https://images.unsplash.com/photo-1513836279014-a89f7a76ae86?q=80&w=600&auto=format&fit=crop";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    /// Rzeszów city centre, where the map opens without geolocation.
    pub const DEFAULT_CENTER: Location = Location {
        lat: 50.041187,
        lng: 21.999121,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TreeStatus {
    #[serde(rename = "Zweryfikowane")]
    Verified,
    #[serde(rename = "Oczekujące")]
    Pending,
}

impl TreeStatus {
    pub fn label(&self) -> &'static str {
        match self {
            TreeStatus::Verified => "Zweryfikowane",
            TreeStatus::Pending => "Oczekujące",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tree {
    pub id: String,
    pub species: String,
    /// Trunk diameter in centimetres.
    pub diameter: u32,
    pub description: String,
    pub location: Location,
    pub photo_url: String,
    pub submitted_by: String,
    pub created_at: DateTime<Utc>,
    pub is_monument: bool,
    pub status: TreeStatus,
}

/// A tree before the store has given it an id and timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTree {
    pub species: String,
    pub diameter: u32,
    pub description: String,
    pub location: Location,
    pub photo_url: String,
    pub submitted_by: String,
    pub is_monument: bool,
    pub status: TreeStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppUser {
    pub uid: String,
    pub email: String,
    pub display_name: String,
    pub points: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

impl AppUser {
    /// Two-letter avatar initials: first and last word, or the first two chars.
    pub fn initials(&self) -> String {
        let words: Vec<&str> = self.display_name.split_whitespace().collect();
        match words.as_slice() {
            [first, .., last] => first.chars().take(1).chain(last.chars().take(1)).collect(),
            _ => self.display_name.chars().take(2).collect(),
        }
    }
}

#[async_trait]
pub trait TreeStore: Send + Sync {
    async fn list(&self) -> Vec<Tree>;

    async fn list_by_user(&self, user_id: &str) -> Vec<Tree>;

    async fn create(&self, tree: NewTree) -> Result<Tree, StoreError>;

    async fn get_user(&self, user_id: &str) -> Option<AppUser>;

    async fn list_users(&self) -> Vec<AppUser>;
}

/// Process-local store. Consistent by construction; nothing is persisted.
#[derive(Debug, Default)]
pub struct MockTreeStore {
    trees: RwLock<Vec<Tree>>,
    users: Vec<AppUser>,
}

impl MockTreeStore {
    pub fn new(trees: Vec<Tree>, users: Vec<AppUser>) -> Self {
        Self {
            trees: RwLock::new(trees),
            users,
        }
    }

    /// The demo data set: six trees around Rzeszów and three users.
    pub fn seeded() -> Self {
        let now = Utc::now();
        Self::new(seed_trees(now), seed_users())
    }
}

#[async_trait]
impl TreeStore for MockTreeStore {
    async fn list(&self) -> Vec<Tree> {
        self.trees.read().await.clone()
    }

    async fn list_by_user(&self, user_id: &str) -> Vec<Tree> {
        self.trees
            .read()
            .await
            .iter()
            .filter(|tree| tree.submitted_by == user_id)
            .cloned()
            .collect()
    }

    async fn create(&self, tree: NewTree) -> Result<Tree, StoreError> {
        if !self.users.iter().any(|user| user.uid == tree.submitted_by) {
            return Err(StoreError::UnknownUser(tree.submitted_by));
        }

        let mut trees = self.trees.write().await;
        let created = Tree {
            id: (trees.len() + 1).to_string(),
            species: tree.species,
            diameter: tree.diameter,
            description: tree.description,
            location: tree.location,
            photo_url: tree.photo_url,
            submitted_by: tree.submitted_by,
            created_at: Utc::now(),
            is_monument: tree.is_monument,
            status: tree.status,
        };
        trees.push(created.clone());
        info!(id = %created.id, species = %created.species, "tree created");
        Ok(created)
    }

    async fn get_user(&self, user_id: &str) -> Option<AppUser> {
        self.users.iter().find(|user| user.uid == user_id).cloned()
    }

    async fn list_users(&self) -> Vec<AppUser> {
        self.users.clone()
    }
}

fn seed_users() -> Vec<AppUser> {
    vec![
        AppUser {
            uid: "mock-user-id".to_string(),
            email: "test@example.com".to_string(),
            display_name: "Eko Wojownik".to_string(),
            points: 1337,
            photo_url: Some(
                "https://images.unsplash.com/photo-1531891437562-4301cf35b7e4?q=80&w=400&auto=format&fit=crop"
                    .to_string(),
            ),
        },
        AppUser {
            uid: "user-2".to_string(),
            email: "anna.nowak@example.com".to_string(),
            display_name: "Anna Nowak".to_string(),
            points: 520,
            photo_url: Some(
                "https://images.unsplash.com/photo-1494790108377-be9c29b29330?q=80&w=400&auto=format&fit=crop"
                    .to_string(),
            ),
        },
        AppUser {
            uid: "user-3".to_string(),
            email: "piotr.kowalski@example.com".to_string(),
            display_name: "Piotr Kowalski".to_string(),
            points: 250,
            photo_url: Some(
                "https://images.unsplash.com/photo-1507003211169-0a1dd7228f2d?q=80&w=400&auto=format&fit=crop"
                    .to_string(),
            ),
        },
    ]
}

fn seed_trees(now: DateTime<Utc>) -> Vec<Tree> {
    let tree = |id: &str,
                species: &str,
                diameter: u32,
                description: &str,
                (lat, lng): (f64, f64),
                submitted_by: &str,
                days_ago: i64,
                is_monument: bool,
                status: TreeStatus| Tree {
        id: id.to_string(),
        species: species.to_string(),
        diameter,
        description: description.to_string(),
        location: Location { lat, lng },
        photo_url: DEFAULT_TREE_IMAGE.to_string(),
        submitted_by: submitted_by.to_string(),
        created_at: now - Duration::days(days_ago),
        is_monument,
        status,
    };

    vec![
        tree(
            "1",
            "Dąb \"Warcisław\"",
            350,
            "Najstarszy dąb w okolicy, świadek wielu historycznych wydarzeń. Jego potężna korona daje schronienie licznym gatunkom ptaków.",
            (50.0614, 22.0045),
            "mock-user-id",
            0,
            true,
            TreeStatus::Verified,
        ),
        tree(
            "2",
            "Wierzba płacząca \"Helena\"",
            180,
            "Piękna wierzba nad brzegiem rzeki, ulubione miejsce spotkań zakochanych. Jej gałęzie tworzą naturalną altanę.",
            (50.041187, 21.999121),
            "user-2",
            5,
            false,
            TreeStatus::Verified,
        ),
        tree(
            "3",
            "Klon \"Pogromca Betonu\"",
            120,
            "Niezwykły klon, który wyrósł w szczelinie chodnika, symbol siły natury w miejskiej dżungli. Inspiruje mieszkańców do dbania o zieleń.",
            (50.049, 22.001),
            "user-3",
            12,
            false,
            TreeStatus::Verified,
        ),
        tree(
            "4",
            "Lipa \"Pszczeli Raj\"",
            250,
            "Rozłożysta lipa, której kwiaty przyciągają setki pszczół. Lokalni pszczelarze cenią ją za wyjątkowy miód.",
            (50.035, 21.98),
            "mock-user-id",
            2,
            true,
            TreeStatus::Verified,
        ),
        tree(
            "5",
            "Buk \"Wędrowiec\"",
            280,
            "Stary buk na skraju lasu, popularny cel spacerów. Mówi się, że pod jego korzeniami ukryty jest skarb.",
            (50.055, 22.023),
            "user-2",
            1,
            true,
            TreeStatus::Pending,
        ),
        tree(
            "6",
            "Jesion \"Strażnik Pola\"",
            210,
            "Samotny jesion na środku pola, daje cień zmęczonym rolnikom. Jego liście pięknie przebarwiają się jesienią.",
            (50.021, 21.995),
            "user-3",
            2,
            false,
            TreeStatus::Pending,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_tree(submitted_by: &str) -> NewTree {
        NewTree {
            species: "Sosna".to_string(),
            diameter: 40,
            description: "Młoda sosna przy szkole".to_string(),
            location: Location::DEFAULT_CENTER,
            photo_url: DEFAULT_TREE_IMAGE.to_string(),
            submitted_by: submitted_by.to_string(),
            is_monument: false,
            status: TreeStatus::Pending,
        }
    }

    #[tokio::test]
    async fn seeded_store_lists_trees_by_user() {
        let store = MockTreeStore::seeded();
        assert_eq!(store.list().await.len(), 6);

        let ids: Vec<String> = store
            .list_by_user("mock-user-id")
            .await
            .into_iter()
            .map(|tree| tree.id)
            .collect();
        assert_eq!(ids, vec!["1", "4"]);
        assert!(store.list_by_user("nobody").await.is_empty());
    }

    #[tokio::test]
    async fn create_assigns_next_id() {
        let store = MockTreeStore::seeded();
        let created = store.create(new_tree("user-2")).await.unwrap();
        assert_eq!(created.id, "7");
        assert_eq!(store.list().await.len(), 7);
        assert_eq!(store.list_by_user("user-2").await.len(), 3);
    }

    #[tokio::test]
    async fn create_rejects_unknown_submitter() {
        let store = MockTreeStore::seeded();
        let err = store.create(new_tree("ghost")).await.unwrap_err();
        assert_eq!(err, StoreError::UnknownUser("ghost".to_string()));
        assert_eq!(store.list().await.len(), 6);
    }

    #[tokio::test]
    async fn get_user_finds_seed_users() {
        let store = MockTreeStore::seeded();
        let user = store.get_user("user-2").await.unwrap();
        assert_eq!(user.display_name, "Anna Nowak");
        assert!(store.get_user("missing").await.is_none());
        assert_eq!(store.list_users().await.len(), 3);
    }

    #[test]
    fn initials_use_first_and_last_word() {
        let mut user = seed_users().remove(0);
        assert_eq!(user.initials(), "EW");
        user.display_name = "Zosia".to_string();
        assert_eq!(user.initials(), "Zo");
    }

    #[test]
    fn status_serializes_with_polish_labels() {
        assert_eq!(
            serde_json::to_value(TreeStatus::Pending).unwrap(),
            serde_json::json!("Oczekujące")
        );
        assert_eq!(TreeStatus::Verified.label(), "Zweryfikowane");
    }
}
