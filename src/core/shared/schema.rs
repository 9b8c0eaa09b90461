diesel::table! {
    departments (id) {
        id -> Uuid,
        name -> Varchar,
        description -> Nullable<Text>,
    }
}

diesel::table! {
    profiles (id) {
        id -> Uuid,
        name -> Varchar,
        email -> Varchar,
        role -> Varchar,
        department_id -> Nullable<Uuid>,
        password_hash -> Text,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    tickets (id) {
        id -> Uuid,
        subject -> Varchar,
        description -> Text,
        priority -> Varchar,
        status -> Varchar,
        department_id -> Uuid,
        created_by -> Uuid,
        assigned_to -> Nullable<Uuid>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    comments (id) {
        id -> Uuid,
        ticket_id -> Uuid,
        user_id -> Uuid,
        content -> Text,
        is_internal -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    attachments (id) {
        id -> Uuid,
        ticket_id -> Uuid,
        file_name -> Varchar,
        file_path -> Text,
        file_size -> Int8,
        file_type -> Varchar,
        uploaded_by -> Uuid,
        uploaded_at -> Timestamptz,
    }
}

diesel::joinable!(tickets -> departments (department_id));
diesel::joinable!(comments -> tickets (ticket_id));
diesel::joinable!(comments -> profiles (user_id));
diesel::joinable!(attachments -> tickets (ticket_id));
diesel::joinable!(profiles -> departments (department_id));

diesel::allow_tables_to_appear_in_same_query!(departments, profiles, tickets, comments, attachments);
