use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::bail;
use ndinterp::{
    is_kind, ConcreteIndex, DenseTensor, FlatIndex, Interpreter, InterpreterError,
    ThreadingOptions,
};

mod common;
use common::{init, VisitCounts};

type Visitor = fn(&[ConcreteIndex], FlatIndex) -> anyhow::Result<()>;

#[test]
fn scenario_index_and_point() {
    let interp = Interpreter::new([2, 3, 4]);
    assert_eq!(interp.size(), 24);
    assert_eq!(interp.index(&[0, 1, 2]), 14);
    assert_eq!(interp.point(23.into()), [1, 2, 3]);
}

#[test]
fn scenario_increment_wraps() {
    let interp = Interpreter::new([2, 3, 4]);
    let mut point = vec![1, 2, 3];
    assert!(!interp.increment(&mut point));
    assert_eq!(point, [0, 0, 0]);
}

#[test]
fn scenario_parallel_traversal() {
    init();
    let interp = Interpreter::new([10, 15, 5]);
    assert_eq!(interp.size(), 750);
    let counts = VisitCounts::new(&interp);

    let result: Result<(), InterpreterError> = interp.try_map_apply(
        Some(|_: &[ConcreteIndex], index: FlatIndex| {
            counts.visit(index);
            Ok(())
        }),
        Some(ThreadingOptions::new(10, 5)),
    );

    assert_eq!(result, Ok(()));
    counts.assert_all_once();
}

#[test]
fn scenario_invalid_dims() {
    assert_eq!(
        Interpreter::try_new([1, 0, 2]),
        Err(InterpreterError::InvalidDimension { axis: 1, value: 0 })
    );
    assert_eq!(
        Interpreter::try_new(Vec::<ConcreteIndex>::new()),
        Err(InterpreterError::EmptyShape)
    );
}

#[test]
fn fill_tensor_in_parallel() {
    init();
    let interp = Interpreter::new([4, 5, 6]);
    let expected = DenseTensor::from_fn(interp.clone(), |p| (p[0] + 4 * p[1] + 20 * p[2]) as f64);

    let cells: Vec<AtomicUsize> = (0..interp.size()).map(|_| AtomicUsize::new(0)).collect();
    interp
        .try_map_apply(
            Some(|point: &[ConcreteIndex], index: FlatIndex| -> anyhow::Result<()> {
                let slot = usize::try_from(isize::from(index))?;
                let value = usize::try_from(point[0] + 4 * point[1] + 20 * point[2])?;
                cells[slot].store(value, Ordering::Relaxed);
                Ok(())
            }),
            Some(ThreadingOptions::new(4, 7)),
        )
        .unwrap();

    let values = cells.into_iter().map(|c| c.into_inner() as f64).collect();
    let filled = DenseTensor::from_values(interp, values).unwrap();
    assert_eq!(filled, expected);
    assert_eq!(filled.point_value(&[3, 4, 5]), 119.);
}

#[test]
fn visitor_error_is_returned_unchanged() {
    init();
    let interp = Interpreter::new([3, 4]);
    let counts = VisitCounts::new(&interp);

    let err = interp
        .try_map_apply(
            Some(|point: &[ConcreteIndex], index: FlatIndex| -> anyhow::Result<()> {
                counts.visit(index);
                if point == [0, 2] {
                    bail!("cannot visit {point:?}");
                }
                Ok(())
            }),
            Some(ThreadingOptions::new(1, 4)),
        )
        .unwrap_err();

    assert_eq!(err.to_string(), "cannot visit [0, 2]");
    assert!(err.downcast_ref::<InterpreterError>().is_none());
    // index 6 lies in [4, 8), the last batch claimed
    assert_eq!(counts.total(), 8);
}

#[test]
fn interpreter_errors_flow_through_anyhow() {
    init();
    let interp = Interpreter::new([3, 4]);
    let other = Interpreter::new([3, 3]);

    let err = interp
        .try_map_apply(
            Some(|point: &[ConcreteIndex], _: FlatIndex| {
                other.check_point(point)?;
                Ok::<(), anyhow::Error>(())
            }),
            None,
        )
        .unwrap_err();

    assert!(is_kind(
        &*err,
        &InterpreterError::PointOutOfBounds {
            axis: 0,
            value: 0,
            bound: 0
        }
    ));
    assert_eq!(
        err.to_string(),
        "point[1] = 3 is out of bounds of dims[1] = 3"
    );
}

#[test]
fn missing_visitor() {
    let interp = Interpreter::new([5]);
    let visitor: Option<Visitor> = None;

    let err = interp.try_map_apply(visitor, None).unwrap_err();
    assert!(is_kind(&*err, &InterpreterError::NilVisitor));
    assert_eq!(err.to_string(), "given map_apply visitor is missing");
}

#[test]
fn every_configuration_visits_once() {
    init();
    let shapes: [Vec<ConcreteIndex>; 4] = [vec![1], vec![13], vec![3, 1, 4], vec![2, 2, 2, 2, 2]];
    for dims in shapes {
        let interp = Interpreter::new(dims);
        for num_threads in [0, 1, 2, 5, 33] {
            for ops_per_thread in [0, 1, 3, 8, 100] {
                let options = ThreadingOptions::new(num_threads, ops_per_thread);
                let counts = VisitCounts::new(&interp);
                interp.map_apply(|_, index| counts.visit(index), Some(options));
                counts.assert_all_once();

                let counts = VisitCounts::new(&interp);
                interp.map_apply_fast(|_, index| counts.visit(index), Some(options));
                counts.assert_all_once();
            }
        }
    }
}

#[test]
fn point_iterator_matches_traversal() {
    let interp = Interpreter::new([3, 2, 2]);
    let sequential: Vec<_> = interp.iter().collect();
    assert_eq!(sequential.len(), 12);

    let visited = std::sync::Mutex::new(Vec::new());
    interp.map_apply(
        |point, index| visited.lock().unwrap().push((point.to_vec(), index)),
        Some(ThreadingOptions::new(3, 2)),
    );
    let mut visited = visited.into_inner().unwrap();
    visited.sort_by_key(|(_, index)| *index);

    for ((point, index), (visited_point, visited_index)) in sequential.iter().zip(&visited) {
        assert_eq!(index, visited_index);
        assert_eq!(point, &visited_point[..]);
    }
}
