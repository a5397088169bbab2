//! OpenAPI document assembled from the handler annotations.

use utoipa::OpenApi;

use super::dto;
use super::handlers::{contacts, events, journal, system, tickets, users};
use crate::domain::event::{EventStatus, NewTier, TierEdit, Venue};
use crate::domain::inventory::LineItem;
use crate::domain::ticket::{TicketStatus, TierSnapshot};
use crate::domain::user::Role;
use crate::error::{ErrorBody, ErrorResponse};
use crate::persistence::models::JournalEntry;

/// OpenAPI 3 description of the REST surface.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "ticket-gateway",
        description = "Event ticketing REST API with atomic tiered inventory. Real-time inventory and catalog changes are streamed over the `/ws` WebSocket."
    ),
    paths(
        system::health_handler,
        system::categories_handler,
        users::create_user,
        users::list_users,
        users::get_user,
        users::update_user,
        users::delete_user,
        users::list_user_tickets,
        events::create_event,
        events::list_events,
        events::get_event,
        events::update_event,
        events::delete_event,
        events::cancel_event,
        events::get_availability,
        tickets::purchase_tickets,
        tickets::list_event_tickets,
        tickets::get_ticket,
        tickets::cancel_ticket,
        contacts::create_contact,
        contacts::list_contacts,
        contacts::get_contact,
        contacts::update_contact,
        contacts::delete_contact,
        journal::list_journal,
    ),
    components(schemas(
        ErrorResponse,
        ErrorBody,
        Role,
        EventStatus,
        Venue,
        NewTier,
        TierEdit,
        LineItem,
        TierSnapshot,
        TicketStatus,
        JournalEntry,
        dto::PaginationMeta,
        dto::CreateUserRequest,
        dto::UpdateUserRequest,
        dto::UserResponse,
        dto::UserListResponse,
        dto::CreateEventRequest,
        dto::UpdateEventRequest,
        dto::TierResponse,
        dto::EventResponse,
        dto::EventListResponse,
        dto::TierAvailability,
        dto::AvailabilityResponse,
        dto::PurchaseRequest,
        dto::TicketResponse,
        dto::TicketListResponse,
        dto::CreateContactRequest,
        dto::UpdateContactRequest,
        dto::ContactResponse,
        dto::ContactListResponse,
        dto::JournalResponse,
    )),
    tags(
        (name = "System", description = "Health and catalog configuration"),
        (name = "Users", description = "User accounts"),
        (name = "Events", description = "Event catalog, tiers and availability"),
        (name = "Tickets", description = "Purchases and cancellations"),
        (name = "Contacts", description = "Contact form inbox"),
        (name = "Journal", description = "Persisted change journal"),
    )
)]
pub struct ApiDoc;
