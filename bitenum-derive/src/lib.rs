use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::ext::IdentExt;
use syn::{
    BinOp, Data, DeriveInput, Error, Expr, Fields, Ident, Lit, Result, UnOp, parse_macro_input,
};

// =============================================================================
// BitEnum derive
// =============================================================================

#[proc_macro_derive(BitEnum)]
pub fn derive_bit_enum(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match derive_bit_enum_impl(input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

struct MemberDef {
    ident: Ident,
    value: u64,
}

fn derive_bit_enum_impl(input: DeriveInput) -> Result<TokenStream2> {
    let variants = match &input.data {
        Data::Enum(data) => &data.variants,
        _ => {
            return Err(Error::new_spanned(
                &input,
                "BitEnum can only be derived for enums",
            ));
        }
    };

    if !input.generics.params.is_empty() {
        return Err(Error::new_spanned(
            &input.generics,
            "BitEnum cannot be derived for generic enums",
        ));
    }

    let members = parse_members(variants)?;

    let name = &input.ident;
    let name_str = name.unraw().to_string();

    let declared = members.iter().map(|m| {
        let member = m.ident.unraw().to_string();
        let value = m.value;
        quote! { (#member, #value) }
    });

    let to_arms = members.iter().map(|m| {
        let ident = &m.ident;
        let value = m.value;
        quote! { #name::#ident => #value, }
    });

    let from_arms = members.iter().map(|m| {
        let ident = &m.ident;
        let value = m.value;
        quote! { #value => ::core::option::Option::Some(#name::#ident), }
    });

    Ok(quote! {
        impl ::bitenum::BitEnum for #name {
            fn flag_set() -> &'static ::bitenum::FlagSetType {
                static FLAG_SET: ::std::sync::OnceLock<::bitenum::FlagSetType> =
                    ::std::sync::OnceLock::new();
                FLAG_SET.get_or_init(|| {
                    ::bitenum::FlagSetType::from_validated_members(#name_str, &[#(#declared),*])
                })
            }

            #[inline]
            fn to_flag(self) -> ::bitenum::Flag<'static> {
                let bits: u64 = match self {
                    #(#to_arms)*
                };
                <Self as ::bitenum::BitEnum>::flag_set().intern_masked(bits)
            }

            fn from_flag(flag: ::bitenum::Flag<'_>) -> ::core::option::Option<Self> {
                if !::core::ptr::eq(flag.flag_set(), <Self as ::bitenum::BitEnum>::flag_set()) {
                    return ::core::option::Option::None;
                }
                match flag.value() {
                    #(#from_arms)*
                    _ => ::core::option::Option::None,
                }
            }
        }
    })
}

// =============================================================================
// Validation
// =============================================================================

fn parse_members<'a>(
    variants: impl IntoIterator<Item = &'a syn::Variant>,
) -> Result<Vec<MemberDef>> {
    let mut aggregated: u64 = 0;
    let mut members: Vec<MemberDef> = Vec::new();

    for variant in variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(Error::new_spanned(
                variant,
                "BitEnum variants cannot have fields",
            ));
        }

        let Some((_, expr)) = &variant.discriminant else {
            return Err(Error::new_spanned(
                variant,
                "BitEnum variants need an explicit power-of-two discriminant",
            ));
        };

        let value = eval_discriminant(expr)?;
        if value == 0 {
            return Err(Error::new_spanned(
                expr,
                "zero is not a valid flag value",
            ));
        }
        if !value.is_power_of_two() {
            return Err(Error::new_spanned(
                expr,
                format!("variant `{}` must be a power of 2", variant.ident),
            ));
        }
        if value & aggregated != 0 {
            let owner = members
                .iter()
                .find(|m| m.value == value)
                .map(|m| m.ident.to_string())
                .unwrap_or_default();
            return Err(Error::new_spanned(
                expr,
                format!(
                    "variant `{}` must be unique power of 2, bit already used by `{}`",
                    variant.ident, owner
                ),
            ));
        }

        aggregated |= value;
        members.push(MemberDef {
            ident: variant.ident.clone(),
            value,
        });
    }

    Ok(members)
}

/// Integer literal, or `a << b` of integer literals.
fn eval_discriminant(expr: &Expr) -> Result<u64> {
    match expr {
        Expr::Lit(lit) => match &lit.lit {
            Lit::Int(int) => int.base10_parse::<u64>(),
            other => Err(Error::new_spanned(
                other,
                "BitEnum discriminants must be integer literals",
            )),
        },
        Expr::Paren(paren) => eval_discriminant(&paren.expr),
        Expr::Group(group) => eval_discriminant(&group.expr),
        Expr::Binary(binary) if matches!(binary.op, BinOp::Shl(_)) => {
            let lhs = eval_discriminant(&binary.left)?;
            let rhs = eval_discriminant(&binary.right)?;
            if rhs >= u64::from(u64::BITS) || (lhs << rhs) >> rhs != lhs {
                return Err(Error::new_spanned(
                    binary,
                    "discriminant does not fit in 64 bits",
                ));
            }
            Ok(lhs << rhs)
        }
        Expr::Unary(unary) if matches!(unary.op, UnOp::Neg(_)) => Err(Error::new_spanned(
            unary,
            "negative values are not valid flags",
        )),
        _ => Err(Error::new_spanned(
            expr,
            "BitEnum discriminants must be integer literals or `1 << N`",
        )),
    }
}
