//! User service: account CRUD with unique emails.

use std::sync::Arc;

use chrono::Utc;

use crate::domain::user::{Role, User, normalize_email, validate_name};
use crate::domain::{EventBus, Notification, Store, UserId};
use crate::error::TicketingError;

/// Partial update of a user. `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    /// New display name.
    pub name: Option<String>,
    /// New email address.
    pub email: Option<String>,
    /// New role.
    pub role: Option<Role>,
}

/// Filters for [`UserService::list_users`].
#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    /// Only users with this role.
    pub role: Option<Role>,
    /// Case-insensitive substring of name or email.
    pub query: Option<String>,
}

/// Orchestrates user account operations.
#[derive(Debug, Clone)]
pub struct UserService {
    store: Arc<Store>,
    event_bus: EventBus,
}

impl UserService {
    /// Creates a new `UserService`.
    #[must_use]
    pub fn new(store: Arc<Store>, event_bus: EventBus) -> Self {
        Self { store, event_bus }
    }

    /// Registers a user.
    ///
    /// # Errors
    ///
    /// Returns [`TicketingError::InvalidRequest`] for invalid fields and
    /// [`TicketingError::EmailTaken`] if the email is already registered.
    pub async fn create_user(
        &self,
        name: &str,
        email: &str,
        role: Role,
    ) -> Result<User, TicketingError> {
        let user = User::new(name, email, role)?;
        self.store
            .users
            .insert_unique(user.id, user.clone(), |existing, new| {
                (existing.email == new.email).then(|| TicketingError::EmailTaken(new.email.clone()))
            })
            .await?;

        self.event_bus.publish(Notification::UserRegistered {
            user_id: user.id,
            email: user.email.clone(),
            timestamp: Utc::now(),
        });
        tracing::info!(user_id = %user.id, role = ?user.role, "user registered");
        Ok(user)
    }

    /// Fetches a user.
    ///
    /// # Errors
    ///
    /// Returns [`TicketingError::UserNotFound`] if the user does not exist.
    pub async fn get_user(&self, user_id: UserId) -> Result<User, TicketingError> {
        self.store
            .users
            .get(user_id)
            .await
            .ok_or(TicketingError::UserNotFound(user_id))
    }

    /// Lists users matching `filter`, oldest first.
    pub async fn list_users(&self, filter: &UserFilter) -> Vec<User> {
        let query = filter.query.as_deref().map(str::to_lowercase);
        let mut users = self
            .store
            .users
            .filter(|u| {
                filter.role.is_none_or(|role| u.role == role)
                    && query.as_deref().is_none_or(|q| {
                        u.name.to_lowercase().contains(q) || u.email.contains(q)
                    })
            })
            .await;
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        users
    }

    /// Applies a partial update.
    ///
    /// # Errors
    ///
    /// Returns [`TicketingError::UserNotFound`], [`TicketingError::InvalidRequest`]
    /// for invalid fields, or [`TicketingError::EmailTaken`] when the new
    /// email belongs to another user.
    pub async fn update_user(
        &self,
        user_id: UserId,
        patch: UserPatch,
    ) -> Result<User, TicketingError> {
        let name = patch.name.as_deref().map(validate_name).transpose()?;
        let email = patch.email.as_deref().map(normalize_email).transpose()?;

        let updated = self
            .store
            .users
            .with_all_mut(|users| {
                if let Some(email) = &email
                    && users.values().any(|u| u.id != user_id && &u.email == email)
                {
                    return Err(TicketingError::EmailTaken(email.clone()));
                }
                let user = users
                    .get_mut(&user_id)
                    .ok_or(TicketingError::UserNotFound(user_id))?;
                if let Some(name) = name {
                    user.name = name;
                }
                if let Some(email) = email {
                    user.email = email;
                }
                if let Some(role) = patch.role {
                    user.role = role;
                }
                user.updated_at = Utc::now();
                Ok(user.clone())
            })
            .await?;

        self.event_bus.publish(Notification::UserUpdated {
            user_id,
            timestamp: Utc::now(),
        });
        tracing::info!(%user_id, "user updated");
        Ok(updated)
    }

    /// Deletes a user who neither organizes events nor holds active tickets.
    ///
    /// The users table stays write-locked from the checks to the removal.
    /// Purchases and event creation read-lock it while they reference the
    /// user, so neither can slip in between.
    ///
    /// # Errors
    ///
    /// Returns [`TicketingError::UserNotFound`] or [`TicketingError::Conflict`].
    pub async fn delete_user(&self, user_id: UserId) -> Result<(), TicketingError> {
        let mut users = self.store.users.write_lock().await;
        if !users.contains_key(&user_id) {
            return Err(TicketingError::UserNotFound(user_id));
        }

        if self.store.events.any(|e| e.organizer_id == user_id).await {
            return Err(TicketingError::Conflict(format!(
                "user {user_id} organizes events"
            )));
        }
        if self
            .store
            .tickets
            .any(|t| t.buyer_id == user_id && t.is_active())
            .await
        {
            return Err(TicketingError::Conflict(format!(
                "user {user_id} holds active tickets"
            )));
        }

        users.remove(&user_id);
        drop(users);

        self.event_bus.publish(Notification::UserRemoved {
            user_id,
            timestamp: Utc::now(),
        });
        tracing::info!(%user_id, "user removed");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::domain::event::tests::{draft, tier};
    use crate::domain::inventory::LineItem;
    use crate::service::{EventService, TicketService};
    use tokio::sync::broadcast::error::TryRecvError;

    fn make_service() -> UserService {
        UserService::new(Arc::new(Store::new()), EventBus::new(100))
    }

    #[tokio::test]
    async fn create_user_emits_notification() {
        let service = make_service();
        let mut rx = service.event_bus.subscribe();

        let result = service
            .create_user("Ada", "ada@example.com", Role::Attendee)
            .await;
        assert!(result.is_ok());

        let Ok(notification) = rx.recv().await else {
            panic!("expected notification");
        };
        assert_eq!(notification.kind_str(), "user_registered");
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected_case_insensitively() {
        let service = make_service();
        let first = service
            .create_user("Ada", "ada@example.com", Role::Attendee)
            .await;
        assert!(first.is_ok());

        let second = service
            .create_user("Ada Two", "ADA@Example.com", Role::Attendee)
            .await;
        assert!(matches!(second, Err(TicketingError::EmailTaken(_))));
    }

    #[tokio::test]
    async fn update_refuses_email_of_other_user() {
        let service = make_service();
        let Ok(ada) = service.create_user("Ada", "ada@example.com", Role::Attendee).await else {
            panic!("create failed");
        };
        let Ok(_) = service.create_user("Bob", "bob@example.com", Role::Attendee).await else {
            panic!("create failed");
        };

        let clash = UserPatch {
            email: Some("bob@example.com".to_string()),
            ..UserPatch::default()
        };
        assert!(matches!(
            service.update_user(ada.id, clash).await,
            Err(TicketingError::EmailTaken(_))
        ));

        let rename = UserPatch {
            name: Some("Ada L.".to_string()),
            email: Some("ada@example.com".to_string()),
            role: Some(Role::Organizer),
        };
        let Ok(updated) = service.update_user(ada.id, rename).await else {
            panic!("update failed");
        };
        assert_eq!(updated.name, "Ada L.");
        assert_eq!(updated.role, Role::Organizer);
    }

    #[tokio::test]
    async fn list_filters_by_role_and_query() {
        let service = make_service();
        let _ = service.create_user("Ada", "ada@example.com", Role::Organizer).await;
        let _ = service.create_user("Bob", "bob@example.com", Role::Attendee).await;

        let organizers = service
            .list_users(&UserFilter {
                role: Some(Role::Organizer),
                query: None,
            })
            .await;
        assert_eq!(organizers.len(), 1);

        let bobs = service
            .list_users(&UserFilter {
                role: None,
                query: Some("BOB".to_string()),
            })
            .await;
        assert_eq!(bobs.len(), 1);
    }

    #[tokio::test]
    async fn delete_missing_user_is_not_found() {
        let service = make_service();
        assert!(matches!(
            service.delete_user(UserId::new()).await,
            Err(TicketingError::UserNotFound(_))
        ));
    }

    #[tokio::test]
    async fn update_and_delete_emit_one_notification_each() {
        let service = make_service();
        let Ok(ada) = service.create_user("Ada", "ada@example.com", Role::Attendee).await else {
            panic!("create failed");
        };
        let mut rx = service.event_bus.subscribe();

        let rename = UserPatch {
            name: Some("Ada L.".to_string()),
            ..UserPatch::default()
        };
        assert!(service.update_user(ada.id, rename).await.is_ok());
        let Ok(Notification::UserUpdated { user_id, .. }) = rx.recv().await else {
            panic!("expected user_updated");
        };
        assert_eq!(user_id, ada.id);
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));

        assert!(service.delete_user(ada.id).await.is_ok());
        let Ok(Notification::UserRemoved { user_id, .. }) = rx.recv().await else {
            panic!("expected user_removed");
        };
        assert_eq!(user_id, ada.id);
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test]
    async fn refused_delete_emits_nothing() {
        let store = Arc::new(Store::new());
        let bus = EventBus::new(100);
        let users = UserService::new(Arc::clone(&store), bus.clone());
        let events = EventService::new(Arc::clone(&store), bus);
        let Ok(olga) = users.create_user("Olga", "olga@example.com", Role::Organizer).await else {
            panic!("create failed");
        };
        let mut d = draft(vec![tier("General", 10)]);
        d.organizer_id = olga.id;
        assert!(events.create_event(d).await.is_ok());

        let mut rx = users.event_bus.subscribe();
        assert!(matches!(
            users.delete_user(olga.id).await,
            Err(TicketingError::Conflict(_))
        ));
        assert!(store.users.get(olga.id).await.is_some());
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn delete_racing_purchase_and_publish_leaves_no_orphans() {
        for round in 0..50 {
            let store = Arc::new(Store::new());
            let bus = EventBus::new(100);
            let users = UserService::new(Arc::clone(&store), bus.clone());
            let events = EventService::new(Arc::clone(&store), bus.clone());
            let tickets = TicketService::new(Arc::clone(&store), bus, 10);

            let Ok(host) = users.create_user("Olga", "olga@example.com", Role::Organizer).await
            else {
                panic!("create failed");
            };
            let Ok(ben) = users.create_user("Ben", "ben@example.com", Role::Organizer).await else {
                panic!("create failed");
            };
            let mut d = draft(vec![tier("General", 10)]);
            d.organizer_id = host.id;
            let Ok(event) = events.create_event(d).await else {
                panic!("create failed");
            };
            let items = [LineItem {
                tier_id: event.tiers[0].id,
                quantity: 1,
            }];
            let mut own = draft(vec![tier("General", 10)]);
            own.organizer_id = ben.id;

            let delete = {
                let users = users.clone();
                tokio::spawn(async move { users.delete_user(ben.id).await })
            };
            let (purchase, publish) = tokio::join!(
                tickets.purchase(event.id, ben.id, &items),
                events.create_event(own),
            );
            let Ok(deleted) = delete.await else {
                panic!("delete task panicked");
            };

            if deleted.is_ok() {
                assert!(store.users.get(ben.id).await.is_none(), "round {round}");
                assert!(purchase.is_err(), "round {round}: ticket sold to deleted user");
                assert!(publish.is_err(), "round {round}: event owned by deleted user");
                assert!(
                    !store
                        .tickets
                        .any(|t| t.buyer_id == ben.id && t.is_active())
                        .await
                );
                assert!(!store.events.any(|e| e.organizer_id == ben.id).await);
            }
        }
    }
}
