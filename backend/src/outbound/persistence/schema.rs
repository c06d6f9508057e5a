// Diesel table definitions mirroring `backend/migrations`.

diesel::table! {
    users (id) {
        id -> Uuid,
        display_name -> Text,
        email -> Text,
        avatar_url -> Nullable<Text>,
        password_hash -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    messages (id) {
        id -> Uuid,
        sender_id -> Uuid,
        sender_email -> Text,
        to_addresses -> Array<Text>,
        subject -> Text,
        content -> Text,
        preview -> Text,
        section -> Text,
        is_read -> Bool,
        is_pinned -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    message_recipients (message_id, user_id) {
        message_id -> Uuid,
        user_id -> Uuid,
    }
}

diesel::table! {
    password_reset_tokens (user_id) {
        user_id -> Uuid,
        token_hash -> Text,
        expires_at -> Timestamptz,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(messages -> users (sender_id));
diesel::joinable!(message_recipients -> messages (message_id));
diesel::joinable!(message_recipients -> users (user_id));
diesel::joinable!(password_reset_tokens -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    messages,
    message_recipients,
    password_reset_tokens,
);
