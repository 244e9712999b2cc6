//! Schema SQL, one constant per migration version.

/// V1: profiles, keys, both operation logs, activity, access tokens.
pub const SCHEMA_V1: &str = "
    CREATE TABLE IF NOT EXISTS profiles (
        id TEXT PRIMARY KEY NOT NULL,
        name TEXT NOT NULL,
        company_name TEXT NOT NULL,
        age INTEGER NOT NULL CHECK (age >= 0),
        credits INTEGER NOT NULL DEFAULT 0 CHECK (credits >= 0),
        plan TEXT NOT NULL DEFAULT 'trial'
            CHECK (plan IN ('trial', 'basic', 'pro', 'infinite')),
        name_change_used INTEGER NOT NULL DEFAULT 0,
        theme_preference TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    ) STRICT;

    CREATE TABLE IF NOT EXISTS license_keys (
        id TEXT PRIMARY KEY NOT NULL,
        user_id TEXT NOT NULL REFERENCES profiles(id),
        key_name TEXT NOT NULL,
        key_value TEXT NOT NULL UNIQUE,
        status TEXT NOT NULL DEFAULT 'active'
            CHECK (status IN ('active', 'inactive', 'revoked')),
        scripts_count INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    ) STRICT;

    CREATE TABLE IF NOT EXISTS encryption_logs (
        id TEXT PRIMARY KEY NOT NULL,
        user_id TEXT NOT NULL REFERENCES profiles(id),
        file_name TEXT NOT NULL,
        file_type TEXT NOT NULL DEFAULT 'lua',
        protection_level TEXT NOT NULL
            CHECK (protection_level IN ('standard', 'advanced', 'undetectable')),
        license_key_id TEXT REFERENCES license_keys(id) ON DELETE SET NULL,
        encrypted_file_path TEXT,
        loader_code TEXT,
        credits_used INTEGER NOT NULL DEFAULT 0,
        status TEXT NOT NULL
            CHECK (status IN ('pending', 'processing', 'completed', 'failed')),
        expiration_date TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    ) STRICT;

    CREATE TABLE IF NOT EXISTS analysis_logs (
        id TEXT PRIMARY KEY NOT NULL,
        user_id TEXT NOT NULL REFERENCES profiles(id),
        file_name TEXT NOT NULL,
        risk_level TEXT CHECK (risk_level IN ('low', 'medium', 'high')),
        vulnerabilities TEXT NOT NULL DEFAULT '[]',
        suggestions TEXT NOT NULL DEFAULT '[]',
        credits_used INTEGER NOT NULL DEFAULT 0,
        status TEXT NOT NULL
            CHECK (status IN ('pending', 'processing', 'completed', 'failed')),
        expiration_date TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    ) STRICT;

    CREATE TABLE IF NOT EXISTS activity_logs (
        id TEXT PRIMARY KEY NOT NULL,
        user_id TEXT NOT NULL,
        action TEXT NOT NULL,
        item_name TEXT NOT NULL,
        status TEXT NOT NULL
            CHECK (status IN ('success', 'completed', 'failed', 'pending')),
        credits_used INTEGER NOT NULL DEFAULT 0,
        details TEXT,
        created_at TEXT NOT NULL
    ) STRICT;

    CREATE TABLE IF NOT EXISTS access_tokens (
        token TEXT PRIMARY KEY NOT NULL,
        user_id TEXT NOT NULL REFERENCES profiles(id),
        created_at TEXT NOT NULL
    ) STRICT;

    CREATE INDEX IF NOT EXISTS idx_license_keys_user ON license_keys(user_id, created_at);
    CREATE INDEX IF NOT EXISTS idx_encryption_logs_user ON encryption_logs(user_id, created_at);
    CREATE INDEX IF NOT EXISTS idx_analysis_logs_user ON analysis_logs(user_id, created_at);
    CREATE INDEX IF NOT EXISTS idx_activity_logs_user ON activity_logs(user_id, created_at);
";
