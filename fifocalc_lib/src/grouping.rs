//! Chronological ordering and (identifier, currency) partitioning.
//!
//! The matcher depends on each group seeing its transactions in acquisition
//! order, so the sort is stable (ties keep input order) and the partition is
//! an explicit order-preserving pass rather than a plain hash grouping.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::transaction::Transaction;

/// One (identifier, currency) partition, transactions in sorted order.
#[derive(Debug, Clone)]
pub struct TxGroup {
    pub identifier: String,
    pub currency: String,
    pub transactions: Vec<Transaction>,
}

/// Stable-sort ascending by date. Rows whose date failed to parse land after
/// every dated row; ties keep input order.
pub fn sort_by_date(transactions: &mut [Transaction]) {
    transactions.sort_by(|a, b| match (a.date, b.date) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

/// Partition sorted transactions into per-key groups. Order inside a group is
/// preserved; groups come out in the order their first transaction appeared.
pub fn partition_groups(transactions: Vec<Transaction>) -> Vec<TxGroup> {
    let mut index: HashMap<(String, String), usize> = HashMap::new();
    let mut groups: Vec<TxGroup> = Vec::new();

    for tx in transactions {
        let key = (tx.identifier.clone(), tx.currency.clone());
        match index.get(&key) {
            Some(&slot) => groups[slot].transactions.push(tx),
            None => {
                index.insert(key, groups.len());
                groups.push(TxGroup {
                    identifier: tx.identifier.clone(),
                    currency: tx.currency.clone(),
                    transactions: vec![tx],
                });
            }
        }
    }

    groups
}
