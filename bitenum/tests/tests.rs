use std::sync::OnceLock;

use bitenum::{
    BinaryOp, ErrorKind, Flag, FlagError, FlagSetType, Operand, Operator, sort_flags, try_sort,
};

fn seq() -> &'static FlagSetType {
    static SEQ: OnceLock<FlagSetType> = OnceLock::new();
    SEQ.get_or_init(|| {
        FlagSetType::builder("Seq")
            .member("one", 1)
            .member("two", 2)
            .member("four", 4)
            .member("eight", 8)
            .finish()
            .unwrap()
    })
}

fn gap() -> &'static FlagSetType {
    static GAP: OnceLock<FlagSetType> = OnceLock::new();
    GAP.get_or_init(|| {
        FlagSetType::builder("Gap")
            .member("two", 2)
            .member("eight", 8)
            .member("thirtytwo", 32)
            .finish()
            .unwrap()
    })
}

fn m(flag_set: &'static FlagSetType, name: &str) -> Flag<'static> {
    flag_set.member(name).unwrap()
}

// =============================================================================
// Declaration
// =============================================================================

#[test]
fn mask_is_or_of_members() {
    assert_eq!(seq().mask(), 15);
    assert_eq!(gap().mask(), 42);

    let mut seen = 0;
    for (_, flag) in gap().members() {
        assert_eq!(flag.value().count_ones(), 1);
        assert_eq!(flag.value() & seen, 0);
        seen |= flag.value();
    }
    assert_eq!(seen, gap().mask());
}

#[test]
fn declaration_order_does_not_matter() {
    let shuffled = FlagSetType::builder("Shuffled")
        .member("eight", 8)
        .member("one", 1)
        .member("four", 4)
        .finish()
        .unwrap();
    let values: Vec<u64> = shuffled.members().map(|(_, f)| f.value()).collect();
    assert_eq!(values, [1, 4, 8]);
}

#[test]
fn bad_declarations() {
    let err = FlagSetType::builder("DuplicateField")
        .member("one", 1)
        .member("two", 1)
        .finish()
        .unwrap_err();
    assert!(matches!(err, FlagError::DuplicateBit { .. }));
    assert_eq!(err.kind(), ErrorKind::Value);

    let err = FlagSetType::builder("NotPowerTwo")
        .member("one", 1)
        .member("two", 3)
        .finish()
        .unwrap_err();
    assert!(matches!(err, FlagError::NotPowerOfTwo { value: 3, .. }));
    assert_eq!(err.kind(), ErrorKind::Value);

    let err = FlagSetType::declare("StringField { one = 1, two = \"2\" }").unwrap_err();
    assert!(matches!(err, FlagError::InvalidMemberType { ref member, .. } if member == "two"));
    assert_eq!(err.kind(), ErrorKind::Type);

    let err = FlagSetType::builder("Zero")
        .member("none", 0)
        .finish()
        .unwrap_err();
    assert!(matches!(err, FlagError::ZeroValue { .. }));
}

#[test]
fn large_power_of_two_is_exact() {
    // 2^53 + 1 rounds to a power of two as a float; must still be rejected
    let err = FlagSetType::builder("Float")
        .member("almost", (1i128 << 53) + 1)
        .finish()
        .unwrap_err();
    assert!(matches!(err, FlagError::NotPowerOfTwo { .. }));

    let ok = FlagSetType::builder("Float")
        .member("exact", 1u64 << 53)
        .finish()
        .unwrap();
    assert_eq!(ok.mask(), 1 << 53);
}

// =============================================================================
// Construction / interning
// =============================================================================

#[test]
fn equality() {
    assert_eq!(m(seq(), "one"), m(seq(), "one"));
    assert_eq!(seq().flag(1).unwrap(), m(seq(), "one"));
    assert_eq!(gap().flag(2).unwrap(), m(gap(), "two"));

    assert_ne!(m(seq(), "two"), m(seq(), "one"));
    assert_ne!(m(seq(), "two"), m(gap(), "two"));
    assert!(1 != m(seq(), "one"));
    assert!(m(seq(), "one") != 1u64);
    assert!(!(m(seq(), "one") == 1i64));
}

#[test]
fn identity() {
    assert!(m(seq(), "one").is_identical(seq().flag(1).unwrap()));
    assert!(m(gap(), "two").is_identical(gap().flag(2).unwrap()));
    assert!(!m(gap(), "two").is_identical(m(seq(), "two")));

    let first = seq().flag(5).unwrap();
    let second = seq().flag(5).unwrap();
    let third = (m(seq(), "four") | m(seq(), "one")).unwrap();
    assert!(first.is_identical(second));
    assert!(first.is_identical(third));
}

#[test]
fn interning_is_idempotent() {
    let set = FlagSetType::declare("Fresh { a = 1, b = 2, c = 4 }").unwrap();
    assert_eq!(set.interned_len(), 3);

    for _ in 0..10 {
        let flag = set.flag(6).unwrap();
        assert_eq!(flag.value(), 6);
    }
    assert_eq!(set.interned_len(), 4);

    let a = set.flag(7).unwrap();
    let b = set.all();
    assert!(a.is_identical(b));
    assert_eq!(set.interned_len(), 5);
}

#[test]
fn bad_constructors() {
    assert!(matches!(
        seq().flag(16),
        Err(FlagError::UnknownBits { value: 16, .. })
    ));
    assert!(matches!(
        gap().flag(9),
        Err(FlagError::UnknownBits { value: 9, .. })
    ));
    assert!(matches!(
        seq().flag(-1),
        Err(FlagError::UnknownBits { value: -1, .. })
    ));

    let err = seq().parse("\"2\"").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Type);

    // zero is always constructible
    assert_eq!(seq().flag(0).unwrap(), seq().flag(0).unwrap());
    assert!(seq().flag(0).unwrap().is_empty());
}

// =============================================================================
// Set operators
// =============================================================================

#[test]
fn union() {
    assert_eq!(
        seq().flag(5).unwrap(),
        (m(seq(), "one") | m(seq(), "four")).unwrap()
    );
    let joined = (m(gap(), "two") | m(gap(), "thirtytwo")).unwrap();
    assert_eq!(gap().flag(34).unwrap(), joined);
    assert!(ptr_eq(joined.flag_set(), gap()));
}

#[test]
fn union_matches_construct() {
    for a in 0..16u64 {
        for b in 0..16u64 {
            let lhs = seq().flag(a).unwrap();
            let rhs = seq().flag(b).unwrap();
            let joined = (lhs | rhs).unwrap();
            assert!(joined.is_identical(seq().flag(a | b).unwrap()));
        }
    }
}

#[test]
fn intersection() {
    assert_eq!(
        seq().flag(1).unwrap(),
        (seq().flag(5).unwrap() & m(seq(), "one")).unwrap()
    );
}

#[test]
fn compound() {
    let all = ((m(gap(), "two") | m(gap(), "eight")).unwrap() | m(gap(), "thirtytwo")).unwrap();
    let outer = (m(gap(), "two") | m(gap(), "thirtytwo")).unwrap();
    assert_eq!(gap().flag(34).unwrap(), (all & outer).unwrap());
    assert_eq!(gap().flag(8).unwrap(), (all ^ outer).unwrap());
}

#[test]
fn complement() {
    assert_eq!(gap().flag(34).unwrap(), !m(gap(), "eight"));
    assert_eq!(
        seq().flag(10).unwrap(),
        !(m(seq(), "one") | m(seq(), "four")).unwrap()
    );
    assert_eq!(!seq().empty(), seq().all());
    assert_eq!(!seq().all(), seq().empty());

    for (_, flag) in gap().members() {
        let expected = gap().flag(gap().mask() & !flag.value()).unwrap();
        assert!((!flag).is_identical(expected));
    }
}

#[test]
fn operators_with_integers() {
    let one = m(seq(), "one");
    assert_eq!((one | 4).unwrap(), seq().flag(5).unwrap());
    assert_eq!((4u64 | one).unwrap(), seq().flag(5).unwrap());
    assert_eq!((seq().all() & 6u8).unwrap().value(), 6);
    assert!(matches!(one | 16, Err(FlagError::UnknownBits { value: 17, .. })));
}

#[test]
fn integer_on_the_left_of_each_width() {
    let one = m(seq(), "one");
    assert_eq!((2u8 | one).unwrap().value(), 3);
    assert_eq!((2u16 ^ one).unwrap().value(), 3);
    assert_eq!((6u32 & seq().all()).unwrap().value(), 6);
    assert_eq!((9i8 - one).unwrap().value(), 8);
    assert_eq!((3i16 * one).unwrap().value(), 3);
    assert_eq!((15i32 / one).unwrap().value(), 15);
    assert_eq!((8i64 >> one).unwrap().value(), 4);
    assert_eq!((1i128 + one).unwrap().value(), 2);
    assert_eq!((-1i32 + one).unwrap(), seq().empty());
}

#[test]
fn arithmetic_wraps_into_flag_set() {
    let two = m(seq(), "two");
    let eight = m(seq(), "eight");

    assert_eq!((two << 2).unwrap(), eight);
    assert_eq!((eight >> 3).unwrap(), m(seq(), "one"));
    assert_eq!((two + two).unwrap(), m(seq(), "four"));
    assert_eq!((eight - two).unwrap().value(), 6);
    assert_eq!((two * 3).unwrap().value(), 6);
    assert_eq!((eight / 3).unwrap().value(), 2);
    assert_eq!((eight % 3).unwrap().value(), 2);
    assert_eq!(two.pow(3).unwrap(), eight);

    assert_eq!((12u64 - two).unwrap().value(), 10);
    assert_eq!((1u64 << two).unwrap().value(), 4);
    assert_eq!((17u64 % eight).unwrap().value(), 1);

    assert!(matches!(two - eight, Err(FlagError::UnknownBits { value: -6, .. })));
    assert!(matches!(
        two / 0,
        Err(FlagError::Arithmetic { op: BinaryOp::FloorDiv, .. })
    ));
}

#[test]
fn cross_set_operand_uses_raw_value() {
    let joined = (m(seq(), "one") | m(gap(), "two")).unwrap();
    assert!(ptr_eq(joined.flag_set(), seq()));
    assert_eq!(joined.value(), 3);

    assert!(matches!(
        m(gap(), "two") | m(seq(), "one"),
        Err(FlagError::UnknownBits { value: 3, .. })
    ));
}

#[test]
fn in_place_operators_disabled() {
    let one = m(seq(), "one");
    for op in BinaryOp::ALL {
        let err = one.apply(Operator::InPlace(op), m(seq(), "four")).unwrap_err();
        assert!(matches!(err, FlagError::UnsupportedOperation { .. }));
        assert_eq!(err.kind(), ErrorKind::NotImplemented);

        let err = one.apply_reflected(Operator::InPlace(op), 4).unwrap_err();
        assert!(matches!(err, FlagError::UnsupportedOperation { .. }));
    }

    let err = one.apply("+=".parse().unwrap(), m(seq(), "four")).unwrap_err();
    assert_eq!(err.to_string(), "unable to call method (+=) on enum type Seq");
}

#[test]
fn dynamic_operators() {
    let one = m(seq(), "one");
    let four = m(seq(), "four");
    assert_eq!(one.apply("|".parse().unwrap(), four).unwrap().value(), 5);
    assert_eq!(one.apply("+".parse().unwrap(), 1).unwrap().value(), 2);
    assert_eq!(four.apply_reflected("-".parse().unwrap(), 5).unwrap().value(), 1);
    assert_eq!(four.apply_reflected("<<".parse().unwrap(), 0).unwrap().value(), 0);
}

// =============================================================================
// Iteration
// =============================================================================

#[test]
fn iteration() {
    let all: Vec<_> = seq().flag(15).unwrap().into_iter().collect();
    assert_eq!(
        all,
        [m(seq(), "one"), m(seq(), "two"), m(seq(), "four"), m(seq(), "eight")]
    );

    let some: Vec<_> = gap().flag(34).unwrap().iter().collect();
    assert_eq!(some, [m(gap(), "two"), m(gap(), "thirtytwo")]);

    assert_eq!(seq().empty().iter().count(), 0);
}

#[test]
fn iteration_order_ignores_union_order() {
    let one = m(seq(), "one");
    let two = m(seq(), "two");
    let four = m(seq(), "four");

    let ooo = ((one | four).unwrap() | two).unwrap();
    let in_order: Vec<_> = ooo.iter().collect();
    assert_eq!(in_order, [one, two, four]);

    let reversed = ((four | two).unwrap() | one).unwrap();
    assert!(reversed.iter().eq(ooo.iter()));
}

#[test]
fn iteration_yields_canonical_members() {
    let iterated = (m(seq(), "two") | m(seq(), "one")).unwrap().iter().next().unwrap();
    assert!(iterated.is_identical(m(seq(), "one")));
}

#[test]
fn iteration_is_restartable() {
    let flag = seq().flag(10).unwrap();
    let first: Vec<_> = flag.iter().collect();
    let second: Vec<_> = flag.iter().collect();
    assert_eq!(first, second);
}

// =============================================================================
// Comparison
// =============================================================================

#[test]
fn comparison() {
    let one = m(seq(), "one");
    let two = m(seq(), "two");
    assert!(one < two);
    assert!(two > one);
    assert!(two == m(seq(), "two"));
    assert!(one.try_lt(two).unwrap());
    assert!(two.try_gt(one).unwrap());

    assert!((one | two).unwrap() > seq().flag(2).unwrap());
    assert!((one | two).unwrap() < m(seq(), "four"));
    assert!(!(m(gap(), "two") == m(seq(), "two")));
}

#[test]
fn cross_set_ordering_fails() {
    let gap_two = m(gap(), "two");
    let seq_two = m(seq(), "two");

    assert!(matches!(gap_two.try_lt(seq_two), Err(FlagError::Incomparable { .. })));
    assert!(matches!(gap_two.try_gt(seq_two), Err(FlagError::Incomparable { .. })));
    assert_eq!(gap_two.partial_cmp(&seq_two), None);

    let err = gap_two.try_cmp(seq_two).unwrap_err();
    assert_eq!(err.to_string(), "unorderable types: Gap Seq");
    assert_eq!(err.kind(), ErrorKind::Type);
}

#[test]
fn heterogeneous_sorts_fail() {
    let mut flags = [m(seq(), "one"), m(gap(), "two")];
    assert!(matches!(sort_flags(&mut flags), Err(FlagError::Incomparable { .. })));

    let mut mixed = [Operand::from(m(seq(), "one")), Operand::from(2)];
    assert!(try_sort(&mut mixed).is_err());

    let mut mixed = [Operand::from(2), Operand::from(m(seq(), "one"))];
    assert!(try_sort(&mut mixed).is_err());
}

#[test]
fn homogeneous_sort() {
    let mut flags = [m(gap(), "eight"), m(gap(), "thirtytwo"), m(gap(), "two")];
    sort_flags(&mut flags).unwrap();
    assert_eq!(flags, [m(gap(), "two"), m(gap(), "eight"), m(gap(), "thirtytwo")]);
}

#[test]
fn membership_is_representability() {
    let two = m(gap(), "two");
    assert!(two.contains(0));
    assert!(two.contains(8));
    assert!(two.contains(42));
    assert!(two.contains(m(gap(), "thirtytwo")));
    assert!(!two.contains(9));
    assert!(!two.contains(-2));
    assert!(!two.contains(64u64));
}

// =============================================================================
// Representation
// =============================================================================

#[test]
fn repr() {
    assert_eq!(m(gap(), "two").to_string(), "Gap(2)");
    assert_eq!((m(gap(), "two") | m(gap(), "eight")).unwrap().to_string(), "Gap(10)");
    assert_eq!(format!("{:?}", seq().flag(6).unwrap()), "Seq(6)");
    assert_eq!(format!("{:#}", seq().flag(6).unwrap()), "Seq(two | four)");
}

#[test]
fn parse_round_trips_alternate_form() {
    let flag = gap().flag(40).unwrap();
    let rendered = format!("{flag:#}");
    let inner = rendered
        .strip_prefix("Gap(")
        .and_then(|s| s.strip_suffix(')'))
        .unwrap();
    assert!(gap().parse(inner).unwrap().is_identical(flag));
}

fn ptr_eq(a: &FlagSetType, b: &FlagSetType) -> bool {
    std::ptr::eq(a, b)
}
