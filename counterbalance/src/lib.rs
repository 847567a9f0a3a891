mod config;
use log::{debug, info};

use std::collections::HashMap;

pub use crate::config::*;

pub mod builder;
pub mod manual;

// **** Private helpers ****

// Short hexadecimal ids, in the style of the original study files.
const ITEM_ID_LEN: usize = 7;

/// A short id derived from an arbitrary seed string.
pub(crate) fn derive_id(seed: &str) -> String {
    sha256::digest(seed).chars().take(ITEM_ID_LEN).collect()
}

/// Derives a fresh plan-item id from the ids already present in the plan.
///
/// The derivation is a hash, not a random draw, so that reconciliation stays
/// a pure function of its inputs. The salt loop only matters if two hash
/// prefixes collide, which does not happen on realistic plan sizes.
fn derive_item_id(existing: &[ProcedurePlanItem], slot: usize) -> String {
    let seed: String = existing
        .iter()
        .map(|item| item.id.as_str())
        .collect::<Vec<&str>>()
        .join(":");
    let mut salt: u32 = 0;
    loop {
        let digest = sha256::digest(format!("{}/{}/{}", seed, slot, salt));
        let id: String = digest.chars().take(ITEM_ID_LEN).collect();
        if !existing.iter().any(|item| item.id == id) {
            return id;
        }
        salt += 1;
    }
}

/// A 3-digit session identifier for one participant run, derived from the
/// study id and the participant number.
fn derive_session_id(study_id: &str, participant: usize) -> String {
    let digest = sha256::digest(format!("{}#{:08}", study_id, participant));
    let prefix: String = digest.chars().take(8).collect();
    // The prefix is 8 hex characters, so this parse cannot fail.
    let n = u32::from_str_radix(prefix.as_str(), 16).unwrap_or(0);
    format!("{:03}", n % 1000)
}

// **** Plan reconciliation ****

/// The number of condition slots the plan must carry for the given
/// variables: the product of the level counts of all within-subject
/// variables.
///
/// A variable with no levels yet counts as 1 so that a freshly created
/// variable does not collapse the slot count. The empty product is 1: a
/// study without within-subject variables still has a single condition
/// slot.
pub fn required_condition_sets(variables: &[IndependentVariable]) -> usize {
    variables
        .iter()
        .filter(|iv| iv.design == Design::Within)
        .fold(1usize, |acc, iv| acc * std::cmp::max(iv.levels.len(), 1))
}

/// Reconciles the procedure plan against the current variable set.
///
/// Returns a new plan whose condition-slot count matches
/// [required_condition_sets]:
/// * missing slots are appended at the end, numbered upwards;
/// * excess slots are demoted to ordinary steps, scanning from the tail of
///   the list, and the surviving slots are then renumbered `1..=required`
///   in positional order;
/// * a plan that already matches is returned unchanged.
///
/// The function is idempotent and touches nothing besides the
/// `is_condition` markers and the appended items.
pub fn reconcile_plan(
    plan: &[ProcedurePlanItem],
    variables: &[IndependentVariable],
) -> Vec<ProcedurePlanItem> {
    let required = required_condition_sets(variables);
    let current = plan.iter().filter(|item| item.is_condition > 0).count();
    debug!(
        "reconcile_plan: {} slot(s) in plan, {} required",
        current, required
    );

    let mut items = plan.to_vec();
    if current < required {
        for slot in (current + 1)..=required {
            let id = derive_item_id(&items, slot);
            items.push(ProcedurePlanItem {
                id,
                title: format!("Condition set {}", slot),
                estimated_time: 0,
                description: None,
                checklist: Vec::new(),
                link: None,
                is_condition: slot as u32,
            });
        }
    } else if current > required {
        // Demote from the tail of the list first. The scan is positional:
        // which slot numbers disappear depends on plan order, not on the
        // numbering.
        let mut excess = current - required;
        for item in items.iter_mut().rev() {
            if excess == 0 {
                break;
            }
            if item.is_condition > 0 {
                item.is_condition = 0;
                excess -= 1;
            }
        }
        // The survivors may carry stale numbers; renumber them in
        // positional order to restore the contiguous range.
        let mut next: u32 = 1;
        for item in items.iter_mut() {
            if item.is_condition > 0 {
                item.is_condition = next;
                next += 1;
            }
        }
    }
    items
}

// **** Level sequencing ****

/// One row of the balanced Latin square over `levels`, for the 0-based
/// `participant` number.
///
/// This is the construction of Bradley (1958), "Complete counterbalancing
/// of immediate sequential effects in a Latin square design": across a full
/// block of participants, every level is immediately preceded by every
/// other level exactly once for even level counts, and as evenly as parity
/// allows for odd counts, where pairs of participants see mirrored rows.
pub fn balanced_latin_square(levels: &[String], participant: usize) -> Vec<String> {
    let n = levels.len();
    if n == 0 {
        return Vec::new();
    }
    let mut result: Vec<String> = Vec::with_capacity(n);
    let mut j = 0usize;
    let mut h = 0usize;
    for i in 0..n {
        let val = if i < 2 || i % 2 != 0 {
            let v = j;
            j += 1;
            v
        } else {
            let v = n - h - 1;
            h += 1;
            v
        };
        let idx = (val + participant) % n;
        result.push(levels[idx].clone());
    }
    // The base construction does not self-balance for odd level counts;
    // every other participant gets the mirrored row.
    if n % 2 != 0 && participant % 2 != 0 {
        result.reverse();
    }
    result
}

/// One row of the plain cyclic Latin square: the levels rotated by the
/// participant number. Each level appears once per slot position across a
/// block of participants, without successor balancing.
fn latin_square_row(levels: &[String], participant: usize) -> Vec<String> {
    let n = levels.len();
    if n == 0 {
        return Vec::new();
    }
    (0..n).map(|i| levels[(i + participant) % n].clone()).collect()
}

/// The permutation of `levels` with lexicographic index `participant mod n!`,
/// decoded from the factorial number system.
fn nth_permutation(
    levels: &[String],
    participant: usize,
) -> Result<Vec<String>, CounterbalanceErrors> {
    let n = levels.len();
    if n == 0 {
        return Ok(Vec::new());
    }
    let mut factorial: u64 = 1;
    for k in 1..=(n as u64) {
        factorial = factorial
            .checked_mul(k)
            .ok_or(CounterbalanceErrors::TooManyPermutations)?;
    }
    let mut remainder = (participant as u64) % factorial;
    let mut pool: Vec<String> = levels.to_vec();
    let mut result: Vec<String> = Vec::with_capacity(n);
    let mut block = factorial;
    for i in (1..=(n as u64)).rev() {
        block /= i;
        let idx = (remainder / block) as usize;
        remainder %= block;
        result.push(pool.remove(idx));
    }
    Ok(result)
}

/// Computes, for every variable, the sequence of level values to present
/// across the plan for the given 0-based `participant` number.
///
/// Arguments:
/// * `variables` the independent variables of the study
/// * `plan_len` the total number of procedure-plan steps, which sets the
///   sequence length for between-subject variables
/// * `participant` the 0-based participant number
///
/// Within-subject sequences have one entry per level, ordered by the
/// variable's balancing strategy. Between-subject sequences repeat the one
/// level assigned to this participant (round-robin over the levels) for
/// every plan step, so a value can be read off at any slot.
pub fn assign_conditions(
    variables: &[IndependentVariable],
    plan_len: usize,
    participant: usize,
) -> Result<HashMap<String, Vec<String>>, CounterbalanceErrors> {
    info!(
        "assign_conditions: {} variable(s), participant {}",
        variables.len(),
        participant
    );
    let mut res: HashMap<String, Vec<String>> = HashMap::new();
    for iv in variables.iter() {
        let sequence: Vec<String> = match iv.design {
            Design::Between => {
                if iv.levels.is_empty() {
                    Vec::new()
                } else {
                    let level = iv.levels[participant % iv.levels.len()].clone();
                    vec![level; plan_len]
                }
            }
            Design::Within => match iv.balancing {
                Balancing::NoBalancing => iv.levels.clone(),
                Balancing::Latin => latin_square_row(&iv.levels, participant),
                Balancing::Balanced => balanced_latin_square(&iv.levels, participant),
                Balancing::Complete => nth_permutation(&iv.levels, participant)?,
            },
        };
        debug!("assign_conditions: {} -> {:?}", iv.name, sequence);
        res.insert(iv.name.clone(), sequence);
    }
    Ok(res)
}

/// The number of participants needed to run every level ordering once: the
/// product of the level counts over every variable that takes part in
/// counterbalancing (all but the within-subject variables without
/// balancing).
pub fn participants_needed(variables: &[IndependentVariable]) -> usize {
    variables
        .iter()
        .filter(|iv| iv.balancing != Balancing::NoBalancing || iv.design != Design::Within)
        .fold(1usize, |acc, iv| acc * iv.levels.len())
}

/// Assembles the run material for one participant: a session id and the
/// condition sequences, in the order of the study's variables.
pub fn generate_run(study: &Study, participant: usize) -> Result<RunAssignment, CounterbalanceErrors> {
    let assignments = assign_conditions(
        &study.independent_variables,
        study.procedure_plan.len(),
        participant,
    )?;
    let conditions: Vec<(String, Vec<String>)> = study
        .independent_variables
        .iter()
        .filter_map(|iv| {
            assignments
                .get(&iv.name)
                .map(|seq| (iv.name.clone(), seq.clone()))
        })
        .collect();
    Ok(RunAssignment {
        session_id: derive_session_id(&study.id, participant),
        conditions,
    })
}
