//! Event routing - One explicit ordered table instead of scattered guards
//!
//! Every inbound event resolves against the same rule list, top to bottom,
//! first match wins. Priority order: commands (valid from almost any
//! state), then the idle catch-all, then callback rules scoped to the
//! current state, then free-text rules scoped to the current state, then
//! the invalid-input fallback.

use crate::events::{EventKind, InboundEvent};
use crate::states::UserState;

/// Handler selected for an inbound event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    // Commands
    StartCommand,
    QuitCommand,
    AdminCommand,
    UnknownCommand,

    // Global navigation callbacks
    Back,
    Quit,

    // Main menu callbacks
    MenuCreate,
    MenuLoad,
    MenuEdit,
    MenuDelete,
    MenuHelp,
    MenuShowId,

    // Conversation flows
    LoadConversationById,
    SelectConversationForRename,
    RenameConversation,
    SelectConversationForDelete,
    ConfirmDelete,
    StartConversation,
    ContinueConversation,

    // Admin flows
    AdminAddPrompt,
    AdminRemoveMenu,
    AdminShowUsers,
    AddWhitelistUser,
    SelectUserForRemoval,
    ConfirmRemoveUser,

    // Everything else
    IdleNotice,
    InvalidInput,
}

/// State guard of a routing rule.
#[derive(Debug, Clone, Copy)]
enum StateGuard {
    Any,
    Is(UserState),
    In(&'static [UserState]),
}

impl StateGuard {
    fn matches(&self, state: UserState) -> bool {
        match self {
            StateGuard::Any => true,
            StateGuard::Is(s) => *s == state,
            StateGuard::In(set) => set.contains(&state),
        }
    }
}

/// Payload guard of a routing rule.
#[derive(Debug, Clone, Copy)]
enum PayloadGuard {
    Any,
    Exact(&'static str),
    OneOf(&'static [&'static str]),
    Digits,
}

impl PayloadGuard {
    fn matches(&self, event: &InboundEvent) -> bool {
        match self {
            PayloadGuard::Any => true,
            PayloadGuard::Exact(p) => event.payload == *p,
            PayloadGuard::OneOf(set) => set.contains(&event.payload.as_str()),
            PayloadGuard::Digits => event.payload_is_digits(),
        }
    }
}

struct Rule {
    kind: EventKind,
    state: StateGuard,
    payload: PayloadGuard,
    route: Route,
}

const fn rule(kind: EventKind, state: StateGuard, payload: PayloadGuard, route: Route) -> Rule {
    Rule {
        kind,
        state,
        payload,
        route,
    }
}

/// Menu states that render a keyboard and reject free text.
const CALLBACK_ONLY_STATES: &[UserState] = &[
    UserState::MainMenu,
    UserState::LoadConversation,
    UserState::EditConversationSelect,
    UserState::DeleteConversationSelect,
    UserState::DeleteConversationConfirm,
    UserState::AdminMenu,
    UserState::AdminRemoveUserSelect,
    UserState::AdminShowUsers,
];

/// The routing table, evaluated top to bottom.
const RULES: &[Rule] = &[
    // Commands run regardless of state; authorization is enforced by the
    // dispatcher after routing.
    rule(
        EventKind::Command,
        StateGuard::Any,
        PayloadGuard::Exact("/start"),
        Route::StartCommand,
    ),
    rule(
        EventKind::Command,
        StateGuard::Any,
        PayloadGuard::Exact("/quit"),
        Route::QuitCommand,
    ),
    rule(
        EventKind::Command,
        StateGuard::Any,
        PayloadGuard::Exact("/admin"),
        Route::AdminCommand,
    ),
    rule(
        EventKind::Command,
        StateGuard::Any,
        PayloadGuard::Any,
        Route::UnknownCommand,
    ),
    // Idle users get the idle notice whatever they send, stale back/quit
    // buttons included. Only a command leaves the idle state.
    rule(
        EventKind::Callback,
        StateGuard::Is(UserState::Idle),
        PayloadGuard::Any,
        Route::IdleNotice,
    ),
    rule(
        EventKind::Text,
        StateGuard::Is(UserState::Idle),
        PayloadGuard::Any,
        Route::IdleNotice,
    ),
    // Global navigation, valid from any non-idle state.
    rule(
        EventKind::Callback,
        StateGuard::Any,
        PayloadGuard::Exact("back"),
        Route::Back,
    ),
    rule(
        EventKind::Callback,
        StateGuard::Any,
        PayloadGuard::Exact("quit"),
        Route::Quit,
    ),
    // Main menu actions.
    rule(
        EventKind::Callback,
        StateGuard::Is(UserState::MainMenu),
        PayloadGuard::Exact("create"),
        Route::MenuCreate,
    ),
    rule(
        EventKind::Callback,
        StateGuard::Is(UserState::MainMenu),
        PayloadGuard::Exact("load"),
        Route::MenuLoad,
    ),
    rule(
        EventKind::Callback,
        StateGuard::Is(UserState::MainMenu),
        PayloadGuard::Exact("edit"),
        Route::MenuEdit,
    ),
    rule(
        EventKind::Callback,
        StateGuard::Is(UserState::MainMenu),
        PayloadGuard::Exact("delete"),
        Route::MenuDelete,
    ),
    rule(
        EventKind::Callback,
        StateGuard::Is(UserState::MainMenu),
        PayloadGuard::Exact("help"),
        Route::MenuHelp,
    ),
    rule(
        EventKind::Callback,
        StateGuard::Is(UserState::MainMenu),
        PayloadGuard::Exact("id"),
        Route::MenuShowId,
    ),
    // Item pickers: a digits payload is always an item id, never an action.
    rule(
        EventKind::Callback,
        StateGuard::Is(UserState::LoadConversation),
        PayloadGuard::Digits,
        Route::LoadConversationById,
    ),
    rule(
        EventKind::Callback,
        StateGuard::Is(UserState::EditConversationSelect),
        PayloadGuard::Digits,
        Route::SelectConversationForRename,
    ),
    rule(
        EventKind::Callback,
        StateGuard::Is(UserState::DeleteConversationSelect),
        PayloadGuard::Digits,
        Route::SelectConversationForDelete,
    ),
    rule(
        EventKind::Callback,
        StateGuard::Is(UserState::DeleteConversationConfirm),
        PayloadGuard::OneOf(&["yes", "no"]),
        Route::ConfirmDelete,
    ),
    // Admin menu and its remove flow. The remove flow stays in one state:
    // digits select the target, yes/no consume it.
    rule(
        EventKind::Callback,
        StateGuard::Is(UserState::AdminMenu),
        PayloadGuard::Exact("add"),
        Route::AdminAddPrompt,
    ),
    rule(
        EventKind::Callback,
        StateGuard::Is(UserState::AdminMenu),
        PayloadGuard::Exact("remove"),
        Route::AdminRemoveMenu,
    ),
    rule(
        EventKind::Callback,
        StateGuard::Is(UserState::AdminMenu),
        PayloadGuard::Exact("show"),
        Route::AdminShowUsers,
    ),
    rule(
        EventKind::Callback,
        StateGuard::Is(UserState::AdminRemoveUserSelect),
        PayloadGuard::Digits,
        Route::SelectUserForRemoval,
    ),
    rule(
        EventKind::Callback,
        StateGuard::Is(UserState::AdminRemoveUserSelect),
        PayloadGuard::OneOf(&["yes", "no"]),
        Route::ConfirmRemoveUser,
    ),
    // Free-text states.
    rule(
        EventKind::Text,
        StateGuard::Is(UserState::NewConversation),
        PayloadGuard::Any,
        Route::StartConversation,
    ),
    rule(
        EventKind::Text,
        StateGuard::Is(UserState::InConversation),
        PayloadGuard::Any,
        Route::ContinueConversation,
    ),
    rule(
        EventKind::Text,
        StateGuard::Is(UserState::EditConversationRename),
        PayloadGuard::Any,
        Route::RenameConversation,
    ),
    rule(
        EventKind::Text,
        StateGuard::Is(UserState::AdminAddUser),
        PayloadGuard::Any,
        Route::AddWhitelistUser,
    ),
    // Free text where a keyboard was expected.
    rule(
        EventKind::Text,
        StateGuard::In(CALLBACK_ONLY_STATES),
        PayloadGuard::Any,
        Route::InvalidInput,
    ),
];

/// Resolve an inbound event to its handler route.
pub fn route_event(state: UserState, event: &InboundEvent) -> Route {
    for rule in RULES {
        if rule.kind == event.kind && rule.state.matches(state) && rule.payload.matches(event) {
            return rule.route;
        }
    }

    // Stray callbacks in states that don't expect them.
    Route::InvalidInput
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commands_win_over_state() {
        // Commands resolve the same way from any state.
        for state in [
            UserState::Idle,
            UserState::MainMenu,
            UserState::InConversation,
            UserState::AdminAddUser,
        ] {
            let ev = InboundEvent::command(1, 1, "/start", 10);
            assert_eq!(route_event(state, &ev), Route::StartCommand);

            let ev = InboundEvent::command(1, 1, "/admin", 10);
            assert_eq!(route_event(state, &ev), Route::AdminCommand);
        }
    }

    #[test]
    fn test_unknown_command_fallback() {
        let ev = InboundEvent::command(1, 1, "/frobnicate", 10);
        assert_eq!(route_event(UserState::MainMenu, &ev), Route::UnknownCommand);
    }

    #[test]
    fn test_digit_callback_disambiguation() {
        // Digits pick an item, words pick an action, in the same state.
        let digits = InboundEvent::callback(1, 1, "17", 10);
        let back = InboundEvent::callback(1, 1, "back", 10);

        assert_eq!(
            route_event(UserState::LoadConversation, &digits),
            Route::LoadConversationById
        );
        assert_eq!(route_event(UserState::LoadConversation, &back), Route::Back);

        assert_eq!(
            route_event(UserState::AdminRemoveUserSelect, &digits),
            Route::SelectUserForRemoval
        );
        let yes = InboundEvent::callback(1, 1, "yes", 10);
        assert_eq!(
            route_event(UserState::AdminRemoveUserSelect, &yes),
            Route::ConfirmRemoveUser
        );
    }

    #[test]
    fn test_menu_actions_are_state_scoped() {
        let create = InboundEvent::callback(1, 1, "create", 10);
        assert_eq!(route_event(UserState::MainMenu, &create), Route::MenuCreate);
        // Same payload outside MainMenu falls through to invalid input.
        assert_eq!(
            route_event(UserState::LoadConversation, &create),
            Route::InvalidInput
        );
    }

    #[test]
    fn test_free_text_in_menu_state_is_invalid() {
        let ev = InboundEvent::text(1, 1, "hello", 10);
        for state in [
            UserState::MainMenu,
            UserState::LoadConversation,
            UserState::DeleteConversationConfirm,
            UserState::AdminMenu,
            UserState::AdminShowUsers,
        ] {
            assert_eq!(route_event(state, &ev), Route::InvalidInput);
        }
    }

    #[test]
    fn test_free_text_states() {
        let ev = InboundEvent::text(1, 1, "Explain recursion", 10);
        assert_eq!(
            route_event(UserState::NewConversation, &ev),
            Route::StartConversation
        );
        assert_eq!(
            route_event(UserState::InConversation, &ev),
            Route::ContinueConversation
        );
        assert_eq!(
            route_event(UserState::EditConversationRename, &ev),
            Route::RenameConversation
        );
        assert_eq!(
            route_event(UserState::AdminAddUser, &ev),
            Route::AddWhitelistUser
        );
    }

    #[test]
    fn test_idle_events_get_idle_notice() {
        let ev = InboundEvent::text(1, 1, "hi", 10);
        assert_eq!(route_event(UserState::Idle, &ev), Route::IdleNotice);
        let ev = InboundEvent::callback(1, 1, "create", 10);
        assert_eq!(route_event(UserState::Idle, &ev), Route::IdleNotice);

        // Stale navigation buttons never pull an idle user back into the
        // menu; only a command leaves the idle state.
        let back = InboundEvent::callback(1, 1, "back", 10);
        let quit = InboundEvent::callback(1, 1, "quit", 10);
        assert_eq!(route_event(UserState::Idle, &back), Route::IdleNotice);
        assert_eq!(route_event(UserState::Idle, &quit), Route::IdleNotice);
    }

    #[test]
    fn test_quit_and_back_valid_everywhere() {
        let quit = InboundEvent::callback(1, 1, "quit", 10);
        let back = InboundEvent::callback(1, 1, "back", 10);
        for state in [
            UserState::MainMenu,
            UserState::InConversation,
            UserState::AdminMenu,
            UserState::DeleteConversationConfirm,
        ] {
            assert_eq!(route_event(state, &quit), Route::Quit);
            assert_eq!(route_event(state, &back), Route::Back);
        }
    }
}
