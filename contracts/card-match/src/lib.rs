#![no_std]

//! # Card Match
//!
//! A single-action on-chain game. Each call to `play` draws two cards in
//! `[1, 10]` from the current ledger context and records whether they match.
//!
//! ## Ledger state
//! Instance storage holds the deployer-supplied `owner` and two `U256`
//! counters: `total_plays` and `total_matches`. Both counters only grow and
//! `total_matches <= total_plays` holds after every invocation.
//!
//! ## Card derivation
//! `card = keccak256(timestamp || player || total_plays || seed) mod 10 + 1`
//! where every integer is a 32-byte big-endian word and `player` is the
//! strkey encoding of the caller. `card1` uses `seed = total_plays` and
//! `card2` uses `seed = total_plays + 1`, with `total_plays` already
//! incremented for the current play.
//!
//! **This is not a secure randomness source.** Every input is visible to the
//! player before submission, so a player who picks the ledger to land in can
//! predict the draw. Anything with real value riding on a match needs a
//! commit-reveal scheme or an external VRF instead.
//!
//! ## Atomicity
//! The host runs each invocation to completion in a total order. Counter
//! writes and the `GamePlayed` event are committed together or not at all.

use soroban_sdk::{
    contract, contracterror, contractevent, contractimpl, contracttype, Address, Bytes, Env, U256,
};

// ═══════════════════════════════════════════════════════════════════════════════
//  Contract Events
// ═══════════════════════════════════════════════════════════════════════════════

/// Emitted once per `play`, after the counters are written.
/// Data is a positional vec `[player, card1, card2, matched]` under the
/// `game_played` topic. Field order is part of the indexer contract; do not
/// reorder.
#[contractevent(data_format = "vec")]
pub struct GamePlayed {
    pub player: Address,
    pub card1: u32,
    pub card2: u32,
    pub matched: bool,
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Errors
// ═══════════════════════════════════════════════════════════════════════════════

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum CardMatchError {
    OwnerNotSet = 1,
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Types & storage keys
// ═══════════════════════════════════════════════════════════════════════════════

/// Outcome of a single play. Not persisted; mirrors `GamePlayed`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PlayResult {
    pub player: Address,
    pub card1: u32,
    pub card2: u32,
    pub matched: bool,
}

/// Snapshot of the whole ledger tuple, read in one invocation.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LedgerState {
    pub owner: Address,
    pub total_plays: U256,
    pub total_matches: U256,
}

#[contracttype]
#[derive(Clone)]
enum StorageKey {
    Owner,
    TotalPlays,
    TotalMatches,
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Constants
// ═══════════════════════════════════════════════════════════════════════════════

/// Number of distinct card faces; cards are `1..=CARD_FACES`.
pub const CARD_FACES: u32 = 10;

// Ledger rate is approximately 5 seconds per ledger on Stellar
const LEDGER_RATE_SECS: u32 = 5;

// TTL expressed in human-readable time units (30 days)
const TTL_SECONDS: u32 = 30 * 24 * 60 * 60; // 2,592,000 seconds

/// TTL for instance storage in ledgers: 30 * 24 * 60 * 60 / 5 = 518,400 ledgers
const INSTANCE_TTL_LEDGERS: u32 = TTL_SECONDS / LEDGER_RATE_SECS;

// ═══════════════════════════════════════════════════════════════════════════════
//  Contract
// ═══════════════════════════════════════════════════════════════════════════════

#[contract]
pub struct CardMatch;

#[contractimpl]
impl CardMatch {
    // ───────────────────────────────────────────────────────────────────────────
    //  Public: Constructor
    // ───────────────────────────────────────────────────────────────────────────

    pub fn __constructor(env: Env, owner: Address) {
        let zero = U256::from_u32(&env, 0);
        env.storage().instance().set(&StorageKey::Owner, &owner);
        env.storage().instance().set(&StorageKey::TotalPlays, &zero);
        env.storage().instance().set(&StorageKey::TotalMatches, &zero);
    }

    // ───────────────────────────────────────────────────────────────────────────
    //  Public: Gameplay
    // ───────────────────────────────────────────────────────────────────────────

    /// Draw two cards for `player` and record the play.
    ///
    /// Any address may play; `require_auth` only binds the call to the
    /// player's identity. Always succeeds once authenticated.
    pub fn play(env: Env, player: Address) -> PlayResult {
        player.require_auth();

        let one = U256::from_u32(&env, 1);
        let total_plays = Self::load_total_plays(&env).add(&one);

        let card1 = Self::derive_card(&env, &player, &total_plays, &total_plays);
        let card2 = Self::derive_card(&env, &player, &total_plays, &total_plays.add(&one));
        let matched = card1 == card2;

        env.storage()
            .instance()
            .set(&StorageKey::TotalPlays, &total_plays);
        if matched {
            let total_matches = Self::load_total_matches(&env).add(&one);
            env.storage()
                .instance()
                .set(&StorageKey::TotalMatches, &total_matches);
        }
        env.storage()
            .instance()
            .extend_ttl(INSTANCE_TTL_LEDGERS, INSTANCE_TTL_LEDGERS);

        GamePlayed {
            player: player.clone(),
            card1,
            card2,
            matched,
        }
        .publish(&env);

        PlayResult {
            player,
            card1,
            card2,
            matched,
        }
    }

    // ───────────────────────────────────────────────────────────────────────────
    //  Public: Queries
    // ───────────────────────────────────────────────────────────────────────────

    pub fn get_total_plays(env: Env) -> U256 {
        Self::load_total_plays(&env)
    }

    pub fn get_total_matches(env: Env) -> U256 {
        Self::load_total_matches(&env)
    }

    pub fn get_owner(env: Env) -> Result<Address, CardMatchError> {
        Self::load_owner(&env)
    }

    /// Owner and both counters from a single invocation.
    pub fn get_ledger(env: Env) -> Result<LedgerState, CardMatchError> {
        Ok(LedgerState {
            owner: Self::load_owner(&env)?,
            total_plays: Self::load_total_plays(&env),
            total_matches: Self::load_total_matches(&env),
        })
    }
}

impl CardMatch {
    // ═══════════════════════════════════════════════════════════════════════════
    //  Internal: Card derivation
    // ═══════════════════════════════════════════════════════════════════════════

    /// `keccak256(timestamp || player || total_plays || seed) mod 10 + 1`.
    ///
    /// Pure in the ledger timestamp and its arguments. Must run inside a
    /// contract frame (or `env.as_contract` in tests).
    pub(crate) fn derive_card(env: &Env, player: &Address, total_plays: &U256, seed: &U256) -> u32 {
        let timestamp = U256::from_u128(env, u128::from(env.ledger().timestamp()));

        let mut preimage = timestamp.to_be_bytes();
        preimage.append(&player.to_string().to_bytes());
        preimage.append(&total_plays.to_be_bytes());
        preimage.append(&seed.to_be_bytes());

        let digest = env.crypto().keccak256(&preimage);
        let value = U256::from_be_bytes(env, &Bytes::from_array(env, &digest.to_array()));
        let face = value.rem_euclid(&U256::from_u32(env, CARD_FACES));

        // face < CARD_FACES, so the narrowing is lossless.
        face.to_u128().unwrap_or(0) as u32 + 1
    }

    // ═══════════════════════════════════════════════════════════════════════════
    //  Internal: Storage
    // ═══════════════════════════════════════════════════════════════════════════

    fn load_owner(env: &Env) -> Result<Address, CardMatchError> {
        env.storage()
            .instance()
            .get(&StorageKey::Owner)
            .ok_or(CardMatchError::OwnerNotSet)
    }

    fn load_total_plays(env: &Env) -> U256 {
        env.storage()
            .instance()
            .get(&StorageKey::TotalPlays)
            .unwrap_or_else(|| U256::from_u32(env, 0))
    }

    fn load_total_matches(env: &Env) -> U256 {
        env.storage()
            .instance()
            .get(&StorageKey::TotalMatches)
            .unwrap_or_else(|| U256::from_u32(env, 0))
    }
}
