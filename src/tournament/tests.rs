//! Tournament unit tests.

use super::*;
use crate::config::TournamentConfig;
use crate::error::{RerankError, Result};

/// Oracle ranking window labels by descending `scores[label]`.
fn by_score(scores: &[u32]) -> impl FnMut(&[usize]) -> Result<Vec<usize>> + '_ {
    move |window: &[usize]| {
        let mut order: Vec<usize> = (0..window.len()).collect();
        order.sort_by_key(|&i| std::cmp::Reverse(scores[window[i]]));
        Ok(order)
    }
}

fn config(window_size: usize, branching_factor: usize) -> TournamentConfig {
    TournamentConfig::new(window_size, branching_factor)
}

// =========== Node ===========

#[test]
fn test_leaf_top_and_invalidate() {
    let mut leaf = TournamentNode::leaf(3);
    assert!(leaf.is_leaf());
    assert!(leaf.is_valid());
    assert_eq!(leaf.top(), &[3]);

    leaf.reset();
    assert_eq!(leaf.top(), &[3]);

    leaf.invalidate();
    assert!(leaf.top().is_empty());
}

#[test]
fn test_internal_node_ignores_invalidate() {
    let mut node = TournamentNode::internal(vec![0, 1], 2);
    node.begin_request(vec![5, 9]);
    node.apply_result(&[1, 0]);
    node.invalidate();
    assert_eq!(node.top(), &[9, 5]);
}

#[test]
fn test_apply_result_skips_duplicates_and_caps_winners() {
    let mut node = TournamentNode::internal(vec![0, 1, 2], 2);
    node.begin_request(vec![10, 11, 10, 12]);
    let kept = node.apply_result(&[2, 0, 3, 1]);
    assert_eq!(kept, 2);
    assert_eq!(node.top(), &[10, 12]);
    assert!(!node.is_awaiting());
}

#[test]
fn test_apply_result_accepts_partial_permutation() {
    let mut node = TournamentNode::internal(vec![0, 1], 3);
    node.begin_request(vec![4, 5, 6, 7]);
    assert_eq!(node.apply_result(&[3]), 1);
    assert_eq!(node.top(), &[7]);
}

#[test]
#[should_panic(expected = "unresolved")]
fn test_top_on_unresolved_node_panics() {
    let node = TournamentNode::internal(vec![0, 1], 2);
    let _ = node.top();
}

#[test]
#[should_panic(expected = "without an outstanding request")]
fn test_apply_result_without_request_panics() {
    let mut node = TournamentNode::internal(vec![0, 1], 2);
    node.apply_result(&[0]);
}

// =========== Tree ===========

#[test]
fn test_build_eight_candidates() {
    let tree = TournamentTree::build(8, &config(4, 2)).unwrap();
    let round_sizes: Vec<usize> = tree.rounds().iter().map(Vec::len).collect();
    assert_eq!(round_sizes, vec![4, 2, 1]);
    assert_eq!(tree.internal_count(), 7);
    assert_eq!(tree.root(), 14);
    assert!(tree.node(tree.root()).parent().is_none());

    for position in 0..8 {
        let leaf = tree.leaf(position);
        assert_eq!(tree.node(leaf).top(), &[position]);
        // leaf → round 1 → round 2 → root
        let mut depth = 0;
        let mut current = tree.node(leaf).parent();
        while let Some(id) = current {
            depth += 1;
            current = tree.node(id).parent();
        }
        assert_eq!(depth, 3);
    }
}

#[test]
fn test_build_promotes_single_trailing_node() {
    // 5 leaves, 2 per node: (0 1) (2 3) 4 → ((0 1)(2 3)) 4 → root
    let tree = TournamentTree::build(5, &config(4, 2)).unwrap();
    let round_sizes: Vec<usize> = tree.rounds().iter().map(Vec::len).collect();
    assert_eq!(round_sizes, vec![2, 1, 1]);
    assert_eq!(tree.node(tree.leaf(4)).parent(), Some(tree.root()));
    assert_eq!(tree.subtree_positions(tree.root()), vec![0, 1, 2, 3, 4]);
}

#[test]
fn test_build_single_candidate_is_leaf_root() {
    let tree = TournamentTree::build(1, &config(4, 2)).unwrap();
    assert_eq!(tree.root(), 0);
    assert!(tree.rounds().is_empty());
    assert_eq!(tree.internal_count(), 0);
}

#[test]
fn test_build_rejects_bad_config_and_empty_input() {
    assert!(matches!(
        TournamentTree::build(8, &config(5, 2)),
        Err(RerankError::ConfigError(_))
    ));
    assert!(matches!(
        TournamentTree::build(0, &config(4, 2)),
        Err(RerankError::ConfigError(_))
    ));
}

#[test]
fn test_all_nodes_lists_children_before_parents() {
    let tree = TournamentTree::build(11, &config(6, 2)).unwrap();
    let order: Vec<NodeId> = tree.all_nodes().collect();
    for &id in &order {
        for &child in tree.node(id).children() {
            assert!(child < id);
        }
    }
    let internal: Vec<NodeId> = tree.internal_nodes().collect();
    assert_eq!(internal.first(), Some(&11));
    assert_eq!(internal.last(), Some(&tree.root()));
}

#[test]
fn test_compute_pending_request_flattens_children() {
    let mut tree = TournamentTree::build(4, &config(4, 2)).unwrap();
    let first = tree.rounds()[0][0];
    assert_eq!(tree.compute_pending_request(first), Some(vec![0, 1]));
    assert!(tree.node(first).is_awaiting());
    assert_eq!(tree.compute_pending_request(tree.leaf(0)), None);
}

#[test]
#[should_panic(expected = "outstanding request")]
fn test_compute_pending_request_twice_panics() {
    let mut tree = TournamentTree::build(4, &config(4, 2)).unwrap();
    let first = tree.rounds()[0][0];
    tree.compute_pending_request(first);
    tree.compute_pending_request(first);
}

// =========== Selector ===========

#[test]
fn test_select_three_of_eight_call_counts() {
    let scores = [3, 9, 1, 7, 5, 8, 2, 6];
    let mut oracle = by_score(&scores);
    let mut selection = TournamentSelector::with_len(8, config(4, 2))
        .unwrap()
        .select(3)
        .unwrap();

    let mut ranked = Vec::new();
    let mut seed_batches = Vec::new();
    let mut calls_before_first_emit = None;
    loop {
        match selection.step().unwrap() {
            Step::Resort(requests) => {
                if ranked.is_empty() {
                    seed_batches.push(requests.len());
                }
                for request in requests {
                    assert_eq!(request.window.len(), 4);
                    let permutation = oracle(&request.window).unwrap();
                    selection.submit(request.ticket, &permutation).unwrap();
                }
            }
            Step::Emit(candidate) => {
                calls_before_first_emit.get_or_insert(selection.oracle_calls());
                ranked.push(candidate);
            }
            Step::Done => break,
        }
    }

    assert_eq!(ranked, vec![1, 5, 3]);
    assert_eq!(seed_batches, vec![4, 2, 1]);
    assert_eq!(calls_before_first_emit, Some(7));
    // three internal nodes on every invalidation path
    assert_eq!(selection.oracle_calls(), 7 + 3 * 3);
}

#[test]
fn test_unbatched_seed_hands_out_single_requests() {
    let scores = [4, 1, 3, 2, 0];
    let mut oracle = by_score(&scores);
    let mut selection = TournamentSelector::with_len(5, config(4, 2).with_seed_batching(false))
        .unwrap()
        .select(2)
        .unwrap();

    let mut ranked = Vec::new();
    loop {
        match selection.step().unwrap() {
            Step::Resort(requests) => {
                assert_eq!(requests.len(), 1);
                let request = &requests[0];
                selection
                    .submit(request.ticket, &oracle(&request.window).unwrap())
                    .unwrap();
            }
            Step::Emit(candidate) => ranked.push(candidate),
            Step::Done => break,
        }
    }
    assert_eq!(ranked, vec![0, 2]);
}

#[test]
fn test_select_all_returns_full_permutation() {
    let scores = [12, 3, 7, 15, 1, 9, 4, 11, 6, 14, 2, 8, 13];
    let selector = TournamentSelector::with_len(scores.len(), config(6, 2)).unwrap();
    let ranked = selector
        .select(scores.len())
        .unwrap()
        .run_with(by_score(&scores))
        .unwrap();

    let mut expected: Vec<usize> = (0..scores.len()).collect();
    expected.sort_by_key(|&i| std::cmp::Reverse(scores[i]));
    assert_eq!(ranked, expected);
    // the last candidate out is the weakest one
    assert_eq!(ranked.last(), Some(&4));
}

#[test]
fn test_select_uses_candidate_labels() {
    let labels = vec![40, 10, 30, 20];
    let selector = TournamentSelector::new(labels, config(4, 2)).unwrap();
    let ranked = selector
        .select(2)
        .unwrap()
        .run_with(|window: &[usize]| {
            assert!(window.iter().all(|l| [10, 20, 30, 40].contains(l)));
            let mut order: Vec<usize> = (0..window.len()).collect();
            order.sort_by_key(|&i| window[i]);
            Ok(order)
        })
        .unwrap();
    assert_eq!(ranked, vec![10, 20]);
}

#[test]
fn test_single_candidate_needs_no_oracle() {
    let mut selection = TournamentSelector::with_len(1, config(4, 2))
        .unwrap()
        .select(1)
        .unwrap();
    assert_eq!(selection.step().unwrap(), Step::Emit(0));
    assert_eq!(selection.step().unwrap(), Step::Done);
    assert_eq!(selection.oracle_calls(), 0);
}

#[test]
fn test_select_zero_issues_no_requests() {
    let mut selection = TournamentSelector::with_len(8, config(4, 2))
        .unwrap()
        .select(0)
        .unwrap();
    assert_eq!(selection.step().unwrap(), Step::Done);
    assert_eq!(selection.oracle_calls(), 0);
}

#[test]
fn test_select_more_than_available_fails() {
    let selector = TournamentSelector::with_len(3, config(4, 2)).unwrap();
    assert!(matches!(selector.select(4), Err(RerankError::ConfigError(_))));
}

#[test]
fn test_duplicate_candidates_rejected() {
    let err = TournamentSelector::new(vec![1, 2, 1], config(4, 2)).unwrap_err();
    assert!(err.to_string().contains("more than once"));
}

#[test]
fn test_padded_requests_strip_fillers() {
    // 3 candidates, window 4: the root sees 2 + 1 real entries and a filler
    let mut selection = TournamentSelector::with_len(3, config(4, 2))
        .unwrap()
        .select(1)
        .unwrap();

    let Step::Resort(requests) = selection.step().unwrap() else {
        panic!("expected seed request");
    };
    assert_eq!(requests[0].window, vec![0, 1, 2, 2]);
    assert_eq!(requests[0].real_len, 2);
    // the filler ranked first must be ignored
    selection.submit(requests[0].ticket, &[3, 1, 0]).unwrap();

    let Step::Resort(requests) = selection.step().unwrap() else {
        panic!("expected root request");
    };
    assert_eq!(requests[0].real_len, 3);
    assert_eq!(requests[0].window.len(), 4);
    selection.submit(requests[0].ticket, &[3, 2, 0, 1]).unwrap();

    assert_eq!(selection.step().unwrap(), Step::Emit(2));
}

#[test]
fn test_empty_permutation_is_inconsistent() {
    let mut selection = TournamentSelector::with_len(4, config(4, 2))
        .unwrap()
        .select(1)
        .unwrap();
    let Step::Resort(requests) = selection.step().unwrap() else {
        panic!("expected seed requests");
    };
    let err = selection.submit(requests[0].ticket, &[]).unwrap_err();
    assert!(matches!(err, RerankError::InconsistentOracle(_)));
}

#[test]
fn test_filler_only_permutation_is_inconsistent_and_abandons_run() {
    let mut selection = TournamentSelector::with_len(3, config(4, 2))
        .unwrap()
        .select(1)
        .unwrap();
    let Step::Resort(requests) = selection.step().unwrap() else {
        panic!("expected seed request");
    };
    let err = selection.submit(requests[0].ticket, &[3, 2]).unwrap_err();
    assert!(matches!(err, RerankError::InconsistentOracle(_)));
    assert!(selection.step().is_err());
}

#[test]
fn test_rejected_answer_in_seed_batch_abandons_whole_batch() {
    let mut selection = TournamentSelector::with_len(8, config(4, 2))
        .unwrap()
        .select(2)
        .unwrap();
    let Step::Resort(requests) = selection.step().unwrap() else {
        panic!("expected seed requests");
    };
    assert_eq!(requests.len(), 4);

    let err = selection.submit(requests[0].ticket, &[]).unwrap_err();
    assert!(matches!(err, RerankError::InconsistentOracle(_)));
    assert!(matches!(
        selection.step(),
        Err(RerankError::InconsistentOracle(_))
    ));

    // late answers for the same batch are refused and leave the tree alone
    let late = selection.submit(requests[1].ticket, &[0, 1, 2, 3]);
    assert!(matches!(late, Err(RerankError::InconsistentOracle(_))));
    assert!(!selection.tree().node(requests[1].ticket.node()).is_valid());
    assert!(selection.step().is_err());
    assert_eq!(selection.oracle_calls(), 4);
}

#[test]
fn test_oracle_failure_propagates() {
    let selector = TournamentSelector::with_len(8, config(4, 2)).unwrap();
    let err = selector
        .select(2)
        .unwrap()
        .run_with(|_| Err(RerankError::OracleError("model crashed".to_string())))
        .unwrap_err();
    assert!(matches!(err, RerankError::OracleError(_)));
}

#[test]
#[should_panic(expected = "still unanswered")]
fn test_stepping_with_unanswered_requests_panics() {
    let mut selection = TournamentSelector::with_len(8, config(4, 2))
        .unwrap()
        .select(1)
        .unwrap();
    let _ = selection.step();
    let _ = selection.step();
}

#[test]
#[should_panic(expected = "no outstanding resort request")]
fn test_submitting_twice_panics() {
    let mut selection = TournamentSelector::with_len(4, config(4, 2))
        .unwrap()
        .select(1)
        .unwrap();
    let Step::Resort(requests) = selection.step().unwrap() else {
        panic!("expected seed requests");
    };
    let ticket = requests[0].ticket;
    selection.submit(ticket, &[0, 1]).unwrap();
    let _ = selection.submit(ticket, &[0, 1]);
}

#[test]
fn test_extracted_candidates_never_reappear() {
    let scores = [5, 17, 2, 11, 8, 14, 3, 16, 1, 12, 9];
    let mut oracle = by_score(&scores);
    let mut selection = TournamentSelector::with_len(scores.len(), config(6, 3))
        .unwrap()
        .select(scores.len())
        .unwrap();

    loop {
        let step = selection.step().unwrap();
        let tree = selection.tree();
        for id in tree.all_nodes() {
            let node = tree.node(id);
            if node.is_valid() {
                assert!(node.top().len() <= 3);
                for candidate in node.top() {
                    assert!(!selection.emitted().contains(candidate));
                    assert!(tree.subtree_positions(id).contains(candidate));
                }
            }
        }
        match step {
            Step::Resort(requests) => {
                for request in requests {
                    let permutation = oracle(&request.window).unwrap();
                    selection.submit(request.ticket, &permutation).unwrap();
                }
            }
            Step::Emit(_) => {}
            Step::Done => break,
        }
    }
    assert_eq!(selection.emitted().len(), scores.len());
}

#[tokio::test]
async fn test_async_run_matches_sync_run() {
    let scores: Vec<u32> = vec![20, 4, 13, 8, 17, 1, 11, 19, 6, 15, 2, 9, 14, 3, 18, 7];
    let oracle = crate::oracle::FnOracle::new(|window: &[usize]| {
        let mut order: Vec<usize> = (0..window.len()).collect();
        order.sort_by_key(|&i| std::cmp::Reverse(scores[window[i]]));
        Ok(order)
    });

    let async_ranked = TournamentSelector::with_len(scores.len(), config(8, 2))
        .unwrap()
        .select(5)
        .unwrap()
        .run(&oracle)
        .await
        .unwrap();
    let sync_ranked = TournamentSelector::with_len(scores.len(), config(8, 2))
        .unwrap()
        .select(5)
        .unwrap()
        .run_with(by_score(&scores))
        .unwrap();

    assert_eq!(async_ranked, vec![0, 7, 14, 4, 9]);
    assert_eq!(async_ranked, sync_ranked);
}
