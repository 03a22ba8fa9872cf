// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Telegram Mini App authentication.

pub mod authenticator;
pub mod init_data;

pub use authenticator::{
    sign_data_check_string, AuthorizationDecision, MockBypass, RejectReason,
    TelegramAuthenticator, VerifiedIdentity, MAX_INIT_DATA_AGE_SECS,
};
pub use init_data::{
    init_data_from_launch_fragment, mock_init_data, EncodedInitData, InitDataError,
    InitDataPayload, TelegramUser, MOCK_USER_ID,
};
