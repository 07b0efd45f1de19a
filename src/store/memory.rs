use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::hash::Hash;
use std::ops::Bound;
use tokio::sync::RwLock;
use tracing::debug;

use super::{text, CourtQuery, CourtStore, SearchQuery, StoreError, StoreResult};
use crate::models::{
    Court, CourtId, CourtStatus, CourtType, CreateCourt, CreateUser, CursorPosition, Page,
    PaginationOpts, UpdateCourt, User, UserId,
};
use crate::schema::{COURTS_TABLE, SCHEMA, USERS_TABLE};

/// In-process engine with the same indexes and ordering as the PostgreSQL one.
///
/// Records are kept in creation order under a store-assigned sequence number.
/// The secondary indexes map index keys to sets of those sequence numbers and
/// are rewritten on every mutation while the write lock is held, so readers
/// never observe a record whose index entries are stale.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

#[derive(Default)]
struct Tables {
    next_seq: i64,
    courts: BTreeMap<i64, Court>,
    seq_by_id: HashMap<CourtId, i64>,
    by_status: HashMap<CourtStatus, BTreeSet<i64>>,
    by_court_type: HashMap<CourtType, BTreeSet<i64>>,
    by_location: BTreeMap<(String, String), BTreeSet<i64>>,
    name_terms: BTreeMap<String, BTreeSet<i64>>,
    users: HashMap<UserId, User>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn validate_court(court: &Court) -> StoreResult<()> {
    let document = serde_json::to_value(court).map_err(anyhow::Error::from)?;
    SCHEMA.validate_document(COURTS_TABLE, &document)?;
    Ok(())
}

fn drop_hashed<K: Eq + Hash>(map: &mut HashMap<K, BTreeSet<i64>>, key: &K, seq: i64) {
    if let Some(seqs) = map.get_mut(key) {
        seqs.remove(&seq);
        if seqs.is_empty() {
            map.remove(key);
        }
    }
}

fn drop_sorted<K: Ord>(map: &mut BTreeMap<K, BTreeSet<i64>>, key: &K, seq: i64) {
    if let Some(seqs) = map.get_mut(key) {
        seqs.remove(&seq);
        if seqs.is_empty() {
            map.remove(key);
        }
    }
}

impl Tables {
    fn index(&mut self, seq: i64, court: &Court) {
        self.by_status.entry(court.status).or_default().insert(seq);
        self.by_court_type
            .entry(court.court_type)
            .or_default()
            .insert(seq);
        self.by_location
            .entry((court.address_state.clone(), court.address_city.clone()))
            .or_default()
            .insert(seq);
        for term in text::terms(&court.name) {
            self.name_terms.entry(term).or_default().insert(seq);
        }
    }

    fn unindex(&mut self, seq: i64, court: &Court) {
        drop_hashed(&mut self.by_status, &court.status, seq);
        drop_hashed(&mut self.by_court_type, &court.court_type, seq);
        drop_sorted(
            &mut self.by_location,
            &(court.address_state.clone(), court.address_city.clone()),
            seq,
        );
        for term in text::terms(&court.name) {
            drop_sorted(&mut self.name_terms, &term, seq);
        }
    }

    /// Sequence numbers selected by an indexed read or scan, in creation order.
    fn candidates(&self, query: &CourtQuery) -> BTreeSet<i64> {
        match query {
            CourtQuery::ByStatus(status) => self.by_status.get(status).cloned().unwrap_or_default(),
            CourtQuery::ByCourtType(court_type) => self
                .by_court_type
                .get(court_type)
                .cloned()
                .unwrap_or_default(),
            CourtQuery::ByLocation { state, city } => {
                let city_matches =
                    |c: &String| city.as_ref().map_or(true, |wanted| c == wanted);
                match state {
                    Some(state) => self
                        .by_location
                        .range((state.clone(), String::new())..)
                        .take_while(|((s, _), _)| s == state)
                        .filter(|((_, c), _)| city_matches(c))
                        .flat_map(|(_, seqs)| seqs.iter().copied())
                        .collect(),
                    // No state prefix: the location index can only be scanned.
                    None => self
                        .by_location
                        .iter()
                        .filter(|((_, c), _)| city_matches(c))
                        .flat_map(|(_, seqs)| seqs.iter().copied())
                        .collect(),
                }
            }
            CourtQuery::FullScan | CourtQuery::Search(_) => self.courts.keys().copied().collect(),
        }
    }

    fn keyset_page(
        &self,
        seqs: &BTreeSet<i64>,
        position: CursorPosition,
        num_items: usize,
    ) -> StoreResult<Page<Court>> {
        let lower = match position {
            CursorPosition::Start => Bound::Unbounded,
            CursorPosition::After { seq } => Bound::Excluded(seq),
            CursorPosition::Offset { .. } => {
                return Err(StoreError::InvalidCursor(
                    "search cursor cannot resume an indexed read".to_string(),
                ))
            }
        };

        let mut remaining = seqs.range((lower, Bound::Unbounded));
        let selected: Vec<i64> = remaining.by_ref().take(num_items).copied().collect();
        let is_done = remaining.next().is_none();

        let continue_cursor = match selected.last() {
            Some(&seq) => CursorPosition::After { seq },
            None => position,
        };

        Ok(Page {
            page: selected
                .iter()
                .filter_map(|seq| self.courts.get(seq).cloned())
                .collect(),
            continue_cursor: continue_cursor.encode(),
            is_done,
        })
    }

    fn search_page(
        &self,
        query: &CourtQuery,
        search: &SearchQuery,
        position: CursorPosition,
        num_items: usize,
    ) -> StoreResult<Page<Court>> {
        let skip = match position {
            CursorPosition::Start => 0,
            CursorPosition::Offset { skip } => skip,
            CursorPosition::After { .. } => {
                return Err(StoreError::InvalidCursor(
                    "indexed cursor cannot resume a search".to_string(),
                ))
            }
        };

        let terms = text::query_terms(&search.text);
        let mut candidates = BTreeSet::new();
        if let Some((last, rest)) = terms.split_last() {
            for term in rest {
                if let Some(seqs) = self.name_terms.get(term) {
                    candidates.extend(seqs);
                }
            }
            for (_, seqs) in self
                .name_terms
                .range(last.clone()..)
                .take_while(|(term, _)| term.starts_with(last.as_str()))
            {
                candidates.extend(seqs);
            }
        }

        let mut ranked: Vec<(usize, i64)> = candidates
            .into_iter()
            .filter_map(|seq| {
                let court = self.courts.get(&seq)?;
                if !query.matches(court) {
                    return None;
                }
                let score = text::relevance(&terms, &court.name);
                (score > 0).then_some((score, seq))
            })
            .collect();
        ranked.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));

        let page: Vec<Court> = ranked
            .iter()
            .skip(usize::try_from(skip).unwrap_or(usize::MAX))
            .take(num_items)
            .filter_map(|(_, seq)| self.courts.get(seq).cloned())
            .collect();

        let consumed = skip.saturating_add(page.len() as u64);
        Ok(Page {
            page,
            continue_cursor: CursorPosition::Offset { skip: consumed }.encode(),
            is_done: ranked.len() as u64 <= consumed,
        })
    }
}

#[async_trait]
impl CourtStore for MemoryStore {
    async fn get_court(&self, id: CourtId) -> StoreResult<Option<Court>> {
        let tables = self.tables.read().await;
        Ok(tables
            .seq_by_id
            .get(&id)
            .and_then(|seq| tables.courts.get(seq))
            .cloned())
    }

    async fn insert_court(&self, court: CreateCourt, now: i64) -> StoreResult<CourtId> {
        let court = Court::from_new(CourtId::new(), court, now);
        validate_court(&court)?;

        let mut tables = self.tables.write().await;
        tables.next_seq += 1;
        let seq = tables.next_seq;
        let id = court.id;

        tables.index(seq, &court);
        tables.seq_by_id.insert(id, seq);
        tables.courts.insert(seq, court);

        debug!("Inserted court {} at sequence {}", id, seq);
        Ok(id)
    }

    async fn patch_court(
        &self,
        id: CourtId,
        patch: &UpdateCourt,
        updated_at: i64,
    ) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let Some(seq) = tables.seq_by_id.get(&id).copied() else {
            return Ok(false);
        };
        let Some(previous) = tables.courts.get(&seq).cloned() else {
            return Ok(false);
        };

        let mut court = previous.clone();
        court.apply_patch(patch, updated_at);
        validate_court(&court)?;

        tables.unindex(seq, &previous);
        tables.index(seq, &court);
        tables.courts.insert(seq, court);
        Ok(true)
    }

    async fn delete_court(&self, id: CourtId) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let Some(seq) = tables.seq_by_id.remove(&id) else {
            return Ok(false);
        };
        if let Some(court) = tables.courts.remove(&seq) {
            tables.unindex(seq, &court);
        }
        Ok(true)
    }

    async fn paginate_courts(
        &self,
        query: &CourtQuery,
        opts: &PaginationOpts,
    ) -> StoreResult<Page<Court>> {
        let position = CursorPosition::from_opts(opts)?;
        let num_items = opts.num_items as usize;
        let tables = self.tables.read().await;

        match query {
            CourtQuery::Search(search) => tables.search_page(query, search, position, num_items),
            _ => {
                let seqs = tables.candidates(query);
                tables.keyset_page(&seqs, position, num_items)
            }
        }
    }

    async fn insert_user(&self, user: CreateUser) -> StoreResult<UserId> {
        let user = User {
            id: UserId::new(),
            email: user.email,
            is_admin: user.is_admin,
        };
        let document = serde_json::to_value(&user).map_err(anyhow::Error::from)?;
        SCHEMA.validate_document(USERS_TABLE, &document)?;

        let id = user.id;
        self.tables.write().await.users.insert(id, user);
        Ok(id)
    }

    async fn get_user(&self, id: UserId) -> StoreResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }
}
